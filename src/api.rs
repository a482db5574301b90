use hyper::{Method, StatusCode};
use serde_json::json;

use crate::response::ApiResponse;
use crate::router::{HandlerFuture, RequestContext, RouteTable};

pub fn register_routes(table: &mut RouteTable) {
    table.register(Method::GET, "/", handle_users);
    table.register(Method::GET, "/topics", handle_topics);
}

/// `GET /` — the full users collection, passed through unmodified.
fn handle_users(ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let dataset = ctx.state.store.dataset().await?;
        Ok(ApiResponse::json(
            StatusCode::OK,
            json!({ "message": dataset.users }),
        ))
    })
}

/// `GET /topics` — topics filtered by the optional `search` parameter.
/// A missing or empty parameter matches everything.
fn handle_topics(ctx: RequestContext) -> HandlerFuture {
    Box::pin(async move {
        let dataset = ctx.state.store.dataset().await?;
        let query = ctx.query.get("search").map_or("", String::as_str);
        let results = dataset.search(query);
        Ok(ApiResponse::json(
            StatusCode::OK,
            json!({ "results": results }),
        ))
    })
}
