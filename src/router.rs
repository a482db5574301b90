use hyper::Method;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::config::AppState;
use crate::error::ApiError;
use crate::response::ApiResponse;

/// Everything a route handler gets: shared application state plus the
/// already-parsed query parameters. Query strings never participate in
/// route matching.
pub struct RequestContext {
    pub state: Arc<AppState>,
    pub query: HashMap<String, String>,
}

pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<ApiResponse, ApiError>> + Send>>;

/// Route handler signature: context in, response description out.
pub type Handler = fn(RequestContext) -> HandlerFuture;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RouteKey {
    method: Method,
    path: String,
}

/// Registry of (method, path) pairs to handlers. Exact-match lookup only:
/// no normalization, no fallbacks, no method-not-allowed distinction.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<RouteKey, Handler>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    pub fn register(&mut self, method: Method, path: &str, handler: Handler) {
        self.routes.insert(
            RouteKey {
                method,
                path: path.to_string(),
            },
            handler,
        );
    }

    /// Look up the handler for an exact method + path match. Any unmatched
    /// combination signals `RouteNotFound`.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Handler, ApiError> {
        let key = RouteKey {
            method: method.clone(),
            path: path.to_string(),
        };
        self.routes
            .get(&key)
            .copied()
            .ok_or(ApiError::RouteNotFound)
    }
}
