use hyper::Method;

use crate::response::{ApiResponse, ResponseWriter};

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Set the fixed cross-origin headers. Applied to every response,
/// not only successful ones.
pub fn apply(writer: &mut ResponseWriter) {
    writer
        .set_header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .set_header("Access-Control-Allow-Methods", ALLOW_METHODS)
        .set_header("Access-Control-Allow-Headers", ALLOW_HEADERS);
}

/// Terminate a preflight request before any route lookup. Browsers expect
/// a fast header-only acknowledgment, so `OPTIONS` never reaches a handler.
pub fn preflight(method: &Method) -> Option<ApiResponse> {
    (*method == Method::OPTIONS).then(ApiResponse::no_content)
}
