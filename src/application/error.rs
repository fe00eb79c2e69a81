//! # Application Errors
//!
//! Error types for the application layer.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(Vec<String>)          - Input rejected before dispatch
//! ├── Domain(DomainError)              - Value object construction failures
//! ├── Aggregation(AggregationError)    - No providers / all failed / fault
//! ├── Configuration(String)            - Startup configuration problems
//! └── Internal(String)                 - Anything else
//! ```
//!
//! # Examples
//!
//! ```
//! use exchange_offers::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("amount must be greater than zero");
//! assert!(err.is_validation());
//! assert_eq!(err.http_status(), 400);
//! ```

use crate::application::envelope::{INTERNAL_ERROR, ResultEnvelope, VALIDATION_FAILED};
use crate::application::services::quote_aggregation::AggregationError;
use crate::domain::errors::DomainError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Input validation failures.
    #[error("validation error: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Domain rule violation.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Aggregation did not produce an offer.
    #[error("aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error with one message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Domain(_))
    }

    /// Returns the HTTP status code this error maps to.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Domain(_) => 400,
            Self::Aggregation(AggregationError::AllProvidersFailed { .. }) => 502,
            Self::Aggregation(AggregationError::NoProvidersAvailable) => 503,
            Self::Aggregation(AggregationError::Internal(_))
            | Self::Configuration(_)
            | Self::Internal(_) => 500,
        }
    }

    /// Converts the error into the envelope callers see.
    #[must_use]
    pub fn to_envelope<T>(&self) -> ResultEnvelope<T> {
        match self {
            Self::Validation(messages) => ResultEnvelope::failure(VALIDATION_FAILED, messages.join("; ")),
            Self::Domain(e) => ResultEnvelope::failure(VALIDATION_FAILED, e.to_string()),
            Self::Aggregation(e) => e.to_envelope(),
            Self::Configuration(_) | Self::Internal(_) => {
                ResultEnvelope::failure(INTERNAL_ERROR, "unexpected server error")
            }
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::envelope::{NO_PROVIDERS, NO_QUOTES};

    #[test]
    fn status_mapping() {
        assert_eq!(ApplicationError::validation("bad").http_status(), 400);
        assert_eq!(
            ApplicationError::from(AggregationError::AllProvidersFailed { offers: vec![] })
                .http_status(),
            502
        );
        assert_eq!(
            ApplicationError::from(AggregationError::NoProvidersAvailable).http_status(),
            503
        );
        assert_eq!(ApplicationError::internal("boom").http_status(), 500);
    }

    #[test]
    fn envelopes() {
        let envelope: ResultEnvelope<()> =
            ApplicationError::Validation(vec!["a".into(), "b".into()]).to_envelope();
        assert_eq!(envelope.message(), VALIDATION_FAILED);
        assert_eq!(envelope.error_detail(), Some("a; b"));

        let envelope: ResultEnvelope<()> =
            ApplicationError::from(AggregationError::AllProvidersFailed { offers: vec![] })
                .to_envelope();
        assert_eq!(envelope.message(), NO_QUOTES);

        let envelope: ResultEnvelope<()> =
            ApplicationError::from(AggregationError::NoProvidersAvailable).to_envelope();
        assert_eq!(envelope.message(), NO_PROVIDERS);

        let envelope: ResultEnvelope<()> = ApplicationError::internal("secret detail").to_envelope();
        assert_eq!(envelope.message(), INTERNAL_ERROR);
        assert_eq!(envelope.error_detail(), Some("unexpected server error"));
    }

    #[test]
    fn display_joins_validation_messages() {
        let err = ApplicationError::Validation(vec!["x".into(), "y".into()]);
        assert_eq!(err.to_string(), "validation error: x; y");
    }
}
