//! # Result Envelope
//!
//! The only shape callers ever see: a success carrying data, or a failure
//! carrying an error detail, each with a human-readable message.
//!
//! Serializes as `{"successful", "message", "data"?, "error"?}`.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::application::envelope::{ResultEnvelope, ALL_FAILED_DETAIL, NO_QUOTES};
//!
//! let envelope: ResultEnvelope<()> = ResultEnvelope::failure(NO_QUOTES, ALL_FAILED_DETAIL);
//! assert!(!envelope.is_successful());
//! assert_eq!(envelope.message(), "no quotes obtainable");
//! assert!(envelope.data().is_none());
//! ```

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Message of a successful aggregation.
pub const QUERY_SUCCEEDED: &str = "query succeeded";
/// Message when every provider failed.
pub const NO_QUOTES: &str = "no quotes obtainable";
/// Error detail when every provider failed.
pub const ALL_FAILED_DETAIL: &str = "all providers failed";
/// Message when no provider is configured.
pub const NO_PROVIDERS: &str = "no providers available";
/// Message for unexpected faults.
pub const INTERNAL_ERROR: &str = "error processing request";
/// Message for rejected input.
pub const VALIDATION_FAILED: &str = "validation failed";

/// Success/failure wrapper returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEnvelope<T> {
    /// The operation produced data.
    Success {
        /// Human-readable message.
        message: String,
        /// Result payload.
        data: T,
    },
    /// The operation produced no data.
    Failure {
        /// Human-readable message.
        message: String,
        /// Error detail.
        error_detail: String,
    },
}

impl<T> ResultEnvelope<T> {
    /// Creates a success envelope.
    #[must_use]
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self::Success {
            message: message.into(),
            data,
        }
    }

    /// Creates a failure envelope.
    #[must_use]
    pub fn failure(message: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            error_detail: error_detail.into(),
        }
    }

    /// Returns true for a success envelope.
    #[inline]
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// Returns the data of a success envelope.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the error detail of a failure envelope.
    #[must_use]
    pub fn error_detail(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error_detail, .. } => Some(error_detail),
        }
    }

    /// Consumes the envelope, returning its data.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }
}

impl<T: Serialize> Serialize for ResultEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultEnvelope", 3)?;
        state.serialize_field("successful", &self.is_successful())?;
        state.serialize_field("message", self.message())?;
        match self {
            Self::Success { data, .. } => state.serialize_field("data", data)?,
            Self::Failure { error_detail, .. } => state.serialize_field("error", error_detail)?,
        }
        state.end()
    }
}
