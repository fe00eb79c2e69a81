//! # Get Best Offer Use Case
//!
//! Validates a caller's query, runs the aggregation, and maps the outcome
//! onto [`ApplicationError`] and the result envelope.

use crate::application::envelope::{QUERY_SUCCEEDED, ResultEnvelope};
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::quote_aggregation::QuoteAggregationEngine;
use crate::application::validation::{BestOfferQuery, RequestValidator};
use crate::domain::entities::BestOfferResult;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Use case for finding the best exchange offer.
#[derive(Debug, Clone)]
pub struct GetBestOfferUseCase {
    validator: Arc<RequestValidator>,
    engine: Arc<QuoteAggregationEngine>,
}

impl GetBestOfferUseCase {
    /// Creates a new use case.
    #[must_use]
    pub fn new(validator: Arc<RequestValidator>, engine: Arc<QuoteAggregationEngine>) -> Self {
        Self { validator, engine }
    }

    /// Validates `query` and runs the aggregation.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for rejected input and
    /// `ApplicationError::Aggregation` when no offer could be selected.
    pub async fn execute(
        &self,
        query: &BestOfferQuery,
        cancel: &CancellationToken,
    ) -> ApplicationResult<BestOfferResult> {
        let request = self.validator.validate(query).map_err(|errors| {
            tracing::info!(errors = ?errors, "best-offer query rejected");
            ApplicationError::Validation(errors)
        })?;

        Ok(self.engine.try_best_offer(&request, cancel).await?)
    }

    /// Runs [`execute`](Self::execute) and wraps the outcome in an envelope.
    pub async fn handle(
        &self,
        query: &BestOfferQuery,
        cancel: &CancellationToken,
    ) -> (u16, ResultEnvelope<BestOfferResult>) {
        match self.execute(query, cancel).await {
            Ok(result) => (200, ResultEnvelope::success(QUERY_SUCCEEDED, result)),
            Err(e) => (e.http_status(), e.to_envelope()),
        }
    }
}
