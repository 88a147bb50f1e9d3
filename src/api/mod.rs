//! REST API module using Axum
//!
//! JSON endpoints under `/api/v1` for dashboards and schedulers. Every
//! response uses the `{data, meta}` / `{error, meta}` envelope.

pub mod envelope;
pub mod handlers;
pub mod middleware;
mod routes;

pub use handlers::ApiState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::middleware as axum_mw;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::defaults::MAX_REQUEST_BODY_BYTES;

/// Restrictive by default (same-origin only).
///
/// Set `HOS_CORS_ORIGINS` to a comma-separated list of allowed origins to let
/// a separately hosted dashboard call the API.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    match std::env::var("HOS_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .fallback(handlers::not_found)
        .layer(axum_mw::from_fn(middleware::add_engine_version_header))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer())
}
