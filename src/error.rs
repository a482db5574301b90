use hyper::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce the dataset from durable storage.
///
/// A load that fails leaves the cache empty, so the next request
/// retries instead of being wedged on a half-initialized snapshot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset {path} is not well-formed JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced to the client as a JSON body with a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No handler registered for the method + path pair.
    #[error("Not Found")]
    RouteNotFound,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}
