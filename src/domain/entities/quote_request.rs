//! # Exchange Quote Request
//!
//! The generic (source, target, amount) request fanned out to providers.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::CurrencyCode;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A request to convert `amount` units of `source_currency` into
/// `target_currency`.
///
/// Immutable once constructed. The amount is always strictly positive.
///
/// # Examples
///
/// ```
/// use exchange_offers::domain::entities::ExchangeQuoteRequest;
/// use rust_decimal::Decimal;
///
/// let request = ExchangeQuoteRequest::parse("USD", "DOP", Decimal::new(100, 0)).unwrap();
/// assert_eq!(request.source_currency().as_str(), "USD");
/// assert!(ExchangeQuoteRequest::parse("USD", "DOP", Decimal::ZERO).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeQuoteRequest {
    source_currency: CurrencyCode,
    target_currency: CurrencyCode,
    amount: Decimal,
}

impl ExchangeQuoteRequest {
    /// Creates a request from validated currency codes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if `amount` is not positive.
    pub fn new(
        source_currency: CurrencyCode,
        target_currency: CurrencyCode,
        amount: Decimal,
    ) -> DomainResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::invalid_amount(format!(
                "amount must be positive, got {amount}"
            )));
        }
        Ok(Self {
            source_currency,
            target_currency,
            amount,
        })
    }

    /// Creates a request from raw currency strings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCurrencyCode` for malformed codes and
    /// `DomainError::InvalidAmount` for a non-positive amount.
    pub fn parse(source: &str, target: &str, amount: Decimal) -> DomainResult<Self> {
        Self::new(CurrencyCode::new(source)?, CurrencyCode::new(target)?, amount)
    }

    /// Returns the source currency.
    #[inline]
    #[must_use]
    pub fn source_currency(&self) -> &CurrencyCode {
        &self.source_currency
    }

    /// Returns the target currency.
    #[inline]
    #[must_use]
    pub fn target_currency(&self) -> &CurrencyCode {
        &self.target_currency
    }

    /// Returns the amount to convert.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

impl fmt::Display for ExchangeQuoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}",
            self.amount, self.source_currency, self.target_currency
        )
    }
}
