//! # REST Handlers
//!
//! Request handlers for the exchange offers API.

use crate::application::envelope::{ResultEnvelope, VALIDATION_FAILED};
use crate::application::use_cases::GetBestOfferUseCase;
use crate::application::validation::BestOfferQuery;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state for every handler.
#[derive(Debug)]
pub struct AppState {
    /// Best-offer use case.
    pub best_offer: GetBestOfferUseCase,
    /// Number of enabled providers.
    pub provider_count: usize,
}

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Number of enabled providers.
    pub providers: usize,
}

/// `GET /api/v1/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state.provider_count,
    })
}

/// `POST /api/v1/exchange/best-offer`
///
/// In-flight provider calls are cancelled if the client goes away before
/// the aggregation finishes.
#[tracing::instrument(skip_all)]
pub async fn best_offer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BestOfferQuery>, JsonRejection>,
) -> Response {
    let query = match payload {
        Ok(Json(query)) => query,
        Err(rejection) => {
            tracing::info!(error = %rejection.body_text(), "malformed best-offer body");
            let envelope: ResultEnvelope<()> =
                ResultEnvelope::failure(VALIDATION_FAILED, rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
        }
    };

    let cancel = CancellationToken::new();
    let _disconnect_guard = cancel.clone().drop_guard();

    let (status, envelope) = state.best_offer.handle(&query, &cancel).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}
