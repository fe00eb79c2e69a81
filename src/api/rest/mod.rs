//! # REST API
//!
//! HTTP surface over the best-offer use case, built on axum.
//!
//! # Endpoints
//!
//! - `POST /api/v1/exchange/best-offer` - Best offer across all providers
//! - `GET /api/v1/health` - Health check
//!
//! | Outcome | Status |
//! |---------|--------|
//! | offer selected | 200 |
//! | malformed body or validation failure | 400 |
//! | every provider failed | 502 |
//! | no providers configured | 503 |
//! | unexpected fault | 500 |
//!
//! # Usage
//!
//! ```ignore
//! use exchange_offers::api::rest::{create_router, AppState};
//!
//! let router = create_router(Arc::new(AppState { best_offer, provider_count }));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, HealthResponse};
pub use routes::create_router;
