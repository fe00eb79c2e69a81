//! # Domain Errors
//!
//! Error types raised when constructing domain values.

use crate::domain::value_objects::ArithmeticError;
use thiserror::Error;

/// Error type for domain value construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Currency code is not three ASCII letters.
    #[error("invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    /// Amount is zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic failure while deriving a value.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an invalid currency code error.
    #[must_use]
    pub fn invalid_currency_code(message: impl Into<String>) -> Self {
        Self::InvalidCurrencyCode(message.into())
    }

    /// Creates an invalid amount error.
    #[must_use]
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
