//! # Provider Errors
//!
//! Error types for provider transport operations.
//!
//! Every variant maps onto an [`OfferFailure`] so the normalizer can fold it
//! into a failed offer without inspecting the message.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::http_status(503, "Service Unavailable");
//! assert_eq!(error.status_code(), Some(503));
//! assert!(error.to_string().contains("503"));
//! ```

use crate::domain::entities::OfferFailure;
use crate::infrastructure::providers::codec::CodecError;
use thiserror::Error;

/// Error type for a single provider request/response cycle.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timed out at the transport level.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Provider answered with a non-2xx status.
    #[error("provider returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Raw error body.
        body: String,
    },

    /// Outbound payload could not be serialized.
    #[error("provider request encoding failed: {0}")]
    Encode(#[source] CodecError),

    /// Provider configuration is unusable.
    #[error("provider configuration error: {message}")]
    InvalidConfig {
        /// Error message.
        message: String,
    },

    /// Internal client error.
    #[error("provider internal error: {message}")]
    InternalError {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error carrying the raw response body.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code, if the provider answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the offer failure classification for this error.
    #[must_use]
    pub fn failure_kind(&self) -> OfferFailure {
        match self {
            Self::Timeout { .. } => OfferFailure::Timeout,
            Self::HttpStatus { .. } => OfferFailure::HttpStatus,
            Self::Connection { .. } | Self::Encode(_) => OfferFailure::Transport,
            Self::InvalidConfig { .. } | Self::InternalError { .. } => OfferFailure::Fault,
        }
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
