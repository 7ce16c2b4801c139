//! HTTP API
//!
//! Thin JSON routes over [`SaintService`]. Successful lookups render as
//! `{"resultados": [...]}`, pipeline failures as `{"erro": "..."}` with a 500,
//! and every response carries an `X-Status-Cache: HIT|MISS` header.

mod routes;

pub use routes::{parse_date_selector, CACHE_CLEARED_MESSAGE, CACHE_STATUS_HEADER};

use crate::service::SaintService;
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the API router
pub fn router(service: Arc<SaintService>) -> Router {
    Router::new()
        .route("/", get(routes::today))
        .route("/limpar-cache", get(routes::clear_cache))
        .route("/:selector", get(routes::by_date))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Read-only, any-origin CORS policy
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_TYPE, CACHE_STATUS_HEADER])
        .max_age(Duration::from_secs(3600))
}
