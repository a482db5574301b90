use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use thiserror::Error;

/// The handler decides the content kind explicitly; nothing is inferred
/// from the runtime shape of the value.
#[derive(Debug)]
pub enum Body {
    Json(serde_json::Value),
    Text(String),
    Empty,
}

/// What a route handler produces: a status code plus a tagged body.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Body,
}

impl ApiResponse {
    pub fn json(status: StatusCode, value: serde_json::Value) -> Self {
        Self {
            status,
            body: Body::Json(value),
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    pub const fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: Body::Empty,
        }
    }
}

/// Returned when a second write is attempted on the same response.
#[derive(Debug, Error)]
#[error("response already sent")]
pub struct ResponseAlreadySent;

#[derive(Debug, PartialEq, Eq)]
enum WriteState {
    Unsent,
    Sent,
}

/// Builds the hyper response for a single request.
///
/// Lifecycle: Unsent -> Sent (terminal). `send` consumes the accumulated
/// status and headers exactly once; any later write attempt is rejected
/// instead of double-writing.
pub struct ResponseWriter {
    status: StatusCode,
    headers: Vec<(String, String)>,
    state: WriteState,
}

impl ResponseWriter {
    pub const fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: Vec::new(),
            state: WriteState::Unsent,
        }
    }

    pub fn status(&mut self, code: StatusCode) -> &mut Self {
        self.status = code;
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) -> &mut Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Serialize `body` and write the response. JSON bodies get
    /// `Content-Type: application/json`, text bodies `text/plain`,
    /// empty bodies no content type at all.
    pub fn send(&mut self, body: Body) -> Result<Response<Full<Bytes>>, ResponseAlreadySent> {
        if self.state == WriteState::Sent {
            return Err(ResponseAlreadySent);
        }
        self.state = WriteState::Sent;

        let mut builder = Response::builder().status(self.status);
        for (key, value) in &self.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = match body {
            Body::Json(value) => builder
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(value.to_string()))),
            Body::Text(text) => builder
                .header("Content-Type", "text/plain")
                .body(Full::new(Bytes::from(text))),
            Body::Empty => builder.body(Full::new(Bytes::new())),
        };

        Ok(response.expect("Failed to build response"))
    }

    /// Convenience form of `send` for handlers that always emit JSON.
    pub fn json(
        &mut self,
        value: serde_json::Value,
    ) -> Result<Response<Full<Bytes>>, ResponseAlreadySent> {
        self.send(Body::Json(value))
    }
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}
