//! # Request Validation
//!
//! Checks an inbound [`BestOfferQuery`] before anything is dispatched and
//! turns it into an [`ExchangeQuoteRequest`].
//!
//! Rules, all reported together:
//!
//! - each currency is exactly three letters and is a supported currency
//! - source and target differ
//! - `SOURCE_TARGET` is a supported pair
//! - `0 < amount < 999 999 999 999 999`
//!
//! Supported currencies are every code appearing in a supported pair. With no
//! pairs configured only the structural rules apply.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::application::validation::{BestOfferQuery, RequestValidator};
//! use rust_decimal::Decimal;
//!
//! let validator = RequestValidator::from_pairs(["USD_DOP", "USD_EUR"]);
//! let query = BestOfferQuery::new("usd", "DOP", Decimal::new(100, 0));
//! let request = validator.validate(&query).unwrap();
//! assert_eq!(request.source_currency().as_str(), "USD");
//!
//! let errors = validator.validate(&BestOfferQuery::new("USD", "USD", Decimal::ZERO)).unwrap_err();
//! assert!(errors.len() >= 2);
//! ```

use crate::domain::entities::ExchangeQuoteRequest;
use crate::domain::value_objects::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Exclusive upper bound for a requested amount.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_7FFF, 0x0003_8D7E, 0, false, 0);

/// Inbound best-offer query as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfferQuery {
    /// Currency to convert from.
    #[serde(default)]
    pub source_currency: String,
    /// Currency to convert to.
    #[serde(default)]
    pub target_currency: String,
    /// Amount of source currency.
    pub amount: Decimal,
}

impl BestOfferQuery {
    /// Creates a query.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>, amount: Decimal) -> Self {
        Self {
            source_currency: source.into(),
            target_currency: target.into(),
            amount,
        }
    }
}

/// Validates best-offer queries against the supported currency pairs.
#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    supported_pairs: BTreeSet<String>,
    supported_currencies: BTreeSet<String>,
}

impl RequestValidator {
    /// Creates a validator from `SOURCE_TARGET` pair names. Malformed
    /// entries are ignored.
    #[must_use]
    pub fn from_pairs<I, P>(pairs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let mut supported_pairs = BTreeSet::new();
        let mut supported_currencies = BTreeSet::new();
        for pair in pairs {
            let pair = pair.as_ref().trim().to_ascii_uppercase();
            let Some((source, target)) = pair.split_once('_') else {
                continue;
            };
            if source.is_empty() || target.is_empty() || target.contains('_') {
                continue;
            }
            supported_currencies.insert(source.to_string());
            supported_currencies.insert(target.to_string());
            supported_pairs.insert(pair);
        }
        Self {
            supported_pairs,
            supported_currencies,
        }
    }

    /// Returns true if pair restrictions are configured.
    #[inline]
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        !self.supported_pairs.is_empty()
    }

    /// Returns the supported pairs in sorted order.
    pub fn supported_pairs(&self) -> impl Iterator<Item = &str> {
        self.supported_pairs.iter().map(String::as_str)
    }

    /// Validates `query`.
    ///
    /// # Errors
    ///
    /// Returns every rule violation found, in rule order.
    pub fn validate(&self, query: &BestOfferQuery) -> Result<ExchangeQuoteRequest, Vec<String>> {
        let mut errors = Vec::new();

        let source = self.check_currency("source", &query.source_currency, &mut errors);
        let target = self.check_currency("target", &query.target_currency, &mut errors);

        if query.amount <= Decimal::ZERO {
            errors.push("amount must be greater than zero".to_string());
        } else if query.amount >= MAX_AMOUNT {
            errors.push("amount is out of range".to_string());
        }

        if let (Some(source), Some(target)) = (&source, &target) {
            if source == target {
                errors.push("source and target currencies must differ".to_string());
            } else if self.is_restricted() {
                let pair = format!("{source}_{target}");
                if !self.supported_pairs.contains(&pair) {
                    errors.push(format!(
                        "currency pair {pair} is not supported; available pairs: {}",
                        self.supported_pairs().collect::<Vec<_>>().join(", ")
                    ));
                }
            }
        }

        match (source, target) {
            (Some(source), Some(target)) if errors.is_empty() => {
                ExchangeQuoteRequest::new(source, target, query.amount).map_err(|e| vec![e.to_string()])
            }
            _ => Err(errors),
        }
    }

    /// Returns the code when it is structurally valid, even if it is not
    /// supported, so the pair rule still runs.
    fn check_currency(
        &self,
        role: &str,
        raw: &str,
        errors: &mut Vec<String>,
    ) -> Option<CurrencyCode> {
        let raw = raw.trim();
        if raw.is_empty() {
            errors.push(format!("{role} currency is required"));
            return None;
        }
        let code = match CurrencyCode::new(raw) {
            Ok(code) => code,
            Err(_) => {
                errors.push(format!("{role} currency must be exactly 3 letters"));
                return None;
            }
        };
        if self.is_restricted() && !self.supported_currencies.contains(code.as_str()) {
            errors.push(format!(
                "{role} currency {code} is not supported; available currencies: {}",
                self.supported_currencies
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        Some(code)
    }
}
