use serde::Deserialize;
use std::net::SocketAddr;

use crate::api;
use crate::router::RouteTable;
use crate::store::DataStore;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub data: DataConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Dataset file, resolved relative to the working directory.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("data.path", "database.json")?
            .set_default("http.server_name", "Topics-API/0.1")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Shared application state, constructed once at startup and passed into
/// the dispatcher. The dataset cache lives here rather than in a
/// module-level global, so tests can build isolated instances.
pub struct AppState {
    pub config: Config,
    pub store: DataStore,
    pub routes: RouteTable,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let mut routes = RouteTable::new();
        api::register_routes(&mut routes);

        Self {
            config: config.clone(),
            store: DataStore::new(&config.data.path),
            routes,
        }
    }
}
