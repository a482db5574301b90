use chrono::Local;
use hyper::{Method, StatusCode, Uri};
use std::net::SocketAddr;
use std::path::Path;

use crate::config::Config;

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Topics API server started successfully");
    println!("Listening on: http://{addr}");
    println!("Log level: {}", config.logging.level);
    println!("Dataset file: {}", config.data.path);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("Using Tokio runtime for concurrency");
    println!("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[{}] [Connection] Accepted from: {peer_addr}", timestamp());
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[{}] [Error] Failed to serve connection: {err:?}", timestamp());
}

pub fn log_request(method: &Method, uri: &Uri) {
    println!("[{}] [Request] {method} {uri}", timestamp());
}

pub fn log_response(status: StatusCode) {
    println!("[{}] [Response] {status}", timestamp());
}

pub fn log_dataset_loaded(path: &Path, users: usize, topics: usize) {
    println!(
        "[{}] [Dataset] Loaded {} ({users} users, {topics} topics)",
        timestamp(),
        path.display()
    );
}

pub fn log_error(msg: &str) {
    eprintln!("[{}] [Error] {msg}", timestamp());
}
