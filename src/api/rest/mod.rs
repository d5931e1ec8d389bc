//! # REST API
//!
//! REST endpoints using axum.
//!
//! # Endpoints
//!
//! - `GET /` - Service info
//! - `GET /health` - Service and per-provider health
//! - `POST /exchange/compare` - Compare every provider, return the best offer
//! - `POST /exchange/rate/{provider}` - Quote a single provider
//! - `POST /upstream/{provider}/exchange/rate` - Native simulator endpoint
//! - `GET /upstream/{provider}/exchange/rate/health` - Native simulator probe
//!
//! # Usage
//!
//! ```ignore
//! use rate_compare::api::rest::{create_router, AppState};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(engine, upstreams, Duration::from_secs(15)));
//! let router = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use handlers::{
    AppState, HealthResponse, RateRequestBody, ServiceInfo, UpstreamHealthResponse,
};
pub use routes::create_router;
