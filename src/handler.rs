use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, StatusCode};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::cors;
use crate::logger;
use crate::response::{ApiResponse, ResponseWriter};
use crate::router::RequestContext;

/// Dispatch a single request: preflight short-circuit, exact-match route
/// lookup, handler execution with error containment, response emission.
///
/// Generic over the body type because no route reads a request body.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path();

    if state.config.logging.access_log {
        logger::log_request(&method, &uri);
    }

    // Preflight terminates before any route lookup.
    if let Some(preflight) = cors::preflight(&method) {
        return Ok(emit(preflight, &state));
    }

    let api_response = match state.routes.dispatch(&method, path) {
        Ok(route_handler) => {
            let ctx = RequestContext {
                state: Arc::clone(&state),
                query: parse_query(uri.query()),
            };
            route_handler(ctx).await.unwrap_or_else(|err| {
                logger::log_error(&format!("{method} {path} failed: {err}"));
                ApiResponse::error(err.status(), &err.to_string())
            })
        }
        Err(err) => ApiResponse::error(err.status(), &err.to_string()),
    };

    if state.config.logging.access_log {
        logger::log_response(api_response.status);
    }

    Ok(emit(api_response, &state))
}

/// Query parameters are parsed separately and handed to the handler;
/// they are never part of the dispatch key.
fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    })
    .unwrap_or_default()
}

/// Write the response through the single-shot writer, with the fixed
/// CORS headers on every response, not only successful ones.
fn emit(api_response: ApiResponse, state: &AppState) -> Response<Full<Bytes>> {
    let mut writer = ResponseWriter::new();
    writer
        .status(api_response.status)
        .set_header("Server", &state.config.http.server_name);
    cors::apply(&mut writer);

    match writer.send(api_response.body) {
        Ok(response) => response,
        // A fresh writer has nothing sent yet; this arm is unreachable.
        Err(_) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Full::new(Bytes::new()))
            .expect("Failed to build response"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, DataConfig, HttpConfig, LoggingConfig, ServerConfig};
    use http_body_util::BodyExt;
    use hyper::Method;
    use std::path::Path;

    const SAMPLE: &str = r#"{
        "users": [
            { "username": "ada", "email": "ada@example.com" },
            { "username": "grace", "email": "grace@example.com" }
        ],
        "topics": [
            { "id": 1, "name": "Variables", "description": "let, const and var scoping rules" },
            { "id": 2, "name": "Objects", "description": "Literals and prototypes" },
            { "id": 3, "name": "Arrays", "description": "Mutable operations vs immutable patterns" },
            { "id": 4, "name": "Functions", "description": "Declarations, expressions and arrows" }
        ]
    }"#;

    fn test_state(dir: &Path) -> Arc<AppState> {
        let data_path = dir.join("database.json");
        std::fs::write(&data_path, SAMPLE).unwrap();
        state_for(&data_path)
    }

    fn state_for(data_path: &Path) -> Arc<AppState> {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
            },
            data: DataConfig {
                path: data_path.to_string_lossy().into_owned(),
            },
            http: HttpConfig {
                server_name: "Topics-API/0.1".to_string(),
            },
        };
        Arc::new(AppState::new(&config))
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn body_json(response: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn root_returns_the_users_collection() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["Content-Type"], "application/json");

        let body = body_json(response).await;
        assert_eq!(body["message"].as_array().unwrap().len(), 2);
        assert_eq!(body["message"][0]["username"], "ada");
    }

    #[tokio::test]
    async fn topics_search_filters_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/topics?search=var"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "Variables");
    }

    #[tokio::test]
    async fn topics_without_query_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/topics"), state)
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn empty_search_matches_everything() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/topics?search="), state)
            .await
            .unwrap();

        let body = body_json(response).await;
        assert_eq!(body["results"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn options_terminates_with_204_on_any_path() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::OPTIONS, "/anything/at/all"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn preflight_never_touches_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        handle_request(request(Method::OPTIONS, "/topics"), Arc::clone(&state))
            .await
            .unwrap();

        assert_eq!(state.store.load_count(), 0);
    }

    #[tokio::test]
    async fn unmatched_route_returns_404_json() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/does-not-exist"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["Content-Type"], "application/json");
        assert_eq!(response.headers()["Access-Control-Allow-Origin"], "*");

        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "error": "Not Found" }));
    }

    #[tokio::test]
    async fn unregistered_method_is_also_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::POST, "/topics"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn query_string_is_stripped_from_the_dispatch_key() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let response = handle_request(request(Method::GET, "/?foo=1"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_500_json() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(&dir.path().join("missing.json"));

        let response = handle_request(request(Method::GET, "/topics"), state)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("missing.json"));
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_the_next_request() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("database.json");
        let state = state_for(&data_path);

        let first = handle_request(request(Method::GET, "/topics"), Arc::clone(&state))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

        std::fs::write(&data_path, SAMPLE).unwrap();
        let second = handle_request(request(Method::GET, "/topics"), state)
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::OK);
    }
}
