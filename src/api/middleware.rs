//! API middleware layers.

use axum::http::header::HeaderName;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Stamp every response with the engine version that produced it.
///
/// Compliance results are only comparable between identical engine builds.
pub async fn add_engine_version_header(
    request: axum::extract::Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static("x-hos-engine-version"),
        HeaderValue::from_static(env!("CARGO_PKG_VERSION")),
    );
    response
}
