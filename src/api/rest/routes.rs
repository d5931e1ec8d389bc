//! # Routes
//!
//! Router construction.

use crate::api::rest::handlers::{
    AppState, compare_rates, health, provider_rate, service_info, upstream_health, upstream_rate,
};
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the service router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/exchange/compare", post(compare_rates))
        .route("/exchange/rate/{provider}", post(provider_rate))
        .route("/upstream/{provider}/exchange/rate", post(upstream_rate))
        .route(
            "/upstream/{provider}/exchange/rate/health",
            get(upstream_health),
        )
        .with_state(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}
