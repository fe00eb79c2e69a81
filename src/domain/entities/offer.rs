//! # Provider Offer
//!
//! A provider's quote for one request, normalized to a common shape.
//!
//! Offers are produced exactly once per provider per request, whether the
//! provider answered or not.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::domain::entities::{OfferFailure, ProviderOffer};
//! use exchange_offers::domain::value_objects::ProviderId;
//! use rust_decimal::Decimal;
//!
//! let failed = ProviderOffer::failed(ProviderId::new("MOCK_API_1"), OfferFailure::Timeout, "timed out", None);
//! assert!(!failed.is_successful());
//! assert_eq!(failed.converted_amount(), Decimal::ZERO);
//! ```

use crate::domain::value_objects::ProviderId;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Classification of why a provider produced no usable offer.
///
/// All kinds score identically; the distinction exists for logs and
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferFailure {
    /// Connection or request-level fault.
    Transport,
    /// Provider answered with a non-2xx status.
    HttpStatus,
    /// Provider exceeded its deadline.
    Timeout,
    /// Caller cancelled the aggregation.
    Cancelled,
    /// 2xx response whose payload was undecodable or incomplete.
    Payload,
    /// Unanticipated fault inside the unit of work.
    Fault,
}

impl OfferFailure {
    /// Returns the failure kind as a static string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT",
            Self::HttpStatus => "HTTP_STATUS",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Payload => "PAYLOAD",
            Self::Fault => "FAULT",
        }
    }

    /// Returns true if the transport succeeded but the payload was unusable.
    #[inline]
    #[must_use]
    pub fn is_payload(&self) -> bool {
        matches!(self, Self::Payload)
    }
}

impl fmt::Display for OfferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized offer from one provider.
///
/// # Invariants
///
/// - Successful: `error_message` is `None`, `converted_amount > 0`, and
///   `implied_rate = converted_amount / amount`.
/// - Failed: `converted_amount` and `implied_rate` are zero and
///   `error_message` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOffer {
    provider_id: ProviderId,
    converted_amount: Decimal,
    implied_rate: Decimal,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_kind: Option<OfferFailure>,
    #[serde(
        rename = "responseLatencyMs",
        serialize_with = "serialize_latency_ms",
        skip_serializing_if = "Option::is_none"
    )]
    response_latency: Option<Duration>,
}

impl ProviderOffer {
    /// Creates a successful offer.
    ///
    /// Callers are responsible for computing `implied_rate` from the
    /// requested amount; the normalizer is the only production caller.
    #[must_use]
    pub fn successful(
        provider_id: ProviderId,
        converted_amount: Decimal,
        implied_rate: Decimal,
        response_latency: Option<Duration>,
    ) -> Self {
        Self {
            provider_id,
            converted_amount,
            implied_rate,
            success: true,
            error_message: None,
            failure_kind: None,
            response_latency,
        }
    }

    /// Creates a failed offer. An empty message is replaced with the
    /// failure kind so the message is never blank.
    #[must_use]
    pub fn failed(
        provider_id: ProviderId,
        kind: OfferFailure,
        message: impl Into<String>,
        response_latency: Option<Duration>,
    ) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = format!("provider failed ({kind})");
        }
        Self {
            provider_id,
            converted_amount: Decimal::ZERO,
            implied_rate: Decimal::ZERO,
            success: false,
            error_message: Some(message),
            failure_kind: Some(kind),
            response_latency,
        }
    }

    /// Returns the provider that produced this offer.
    #[inline]
    #[must_use]
    pub fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Returns the converted amount (zero for failed offers).
    #[inline]
    #[must_use]
    pub fn converted_amount(&self) -> Decimal {
        self.converted_amount
    }

    /// Returns the implied rate (zero for failed offers).
    #[inline]
    #[must_use]
    pub fn implied_rate(&self) -> Decimal {
        self.implied_rate
    }

    /// Returns true if the provider produced a usable quote.
    #[inline]
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.success
    }

    /// Returns the error message of a failed offer.
    #[inline]
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the failure classification of a failed offer.
    #[inline]
    #[must_use]
    pub fn failure_kind(&self) -> Option<OfferFailure> {
        self.failure_kind
    }

    /// Returns the wall-clock latency of the provider call, if measured.
    #[inline]
    #[must_use]
    pub fn response_latency(&self) -> Option<Duration> {
        self.response_latency
    }
}

impl fmt::Display for ProviderOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_message {
            None => write!(
                f,
                "Offer({} amount={} rate={})",
                self.provider_id, self.converted_amount, self.implied_rate
            ),
            Some(error) => write!(f, "Offer({} failed: {})", self.provider_id, error),
        }
    }
}

fn serialize_latency_ms<S: Serializer>(
    latency: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match latency {
        Some(latency) => serializer.serialize_u64(
            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
        ),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn failed_offer_is_zeroed() {
        let offer = ProviderOffer::failed(
            ProviderId::new("P1"),
            OfferFailure::HttpStatus,
            "503 Service Unavailable",
            None,
        );
        assert!(!offer.is_successful());
        assert_eq!(offer.converted_amount(), Decimal::ZERO);
        assert_eq!(offer.implied_rate(), Decimal::ZERO);
        assert_eq!(offer.error_message(), Some("503 Service Unavailable"));
        assert_eq!(offer.failure_kind(), Some(OfferFailure::HttpStatus));
    }

    #[test]
    fn failed_offer_never_has_blank_message() {
        let offer = ProviderOffer::failed(ProviderId::new("P1"), OfferFailure::Fault, "  ", None);
        assert_eq!(offer.error_message(), Some("provider failed (FAULT)"));
    }

    #[test]
    fn successful_offer_has_no_error() {
        let offer = ProviderOffer::successful(
            ProviderId::new("P2"),
            Decimal::new(5263, 0),
            Decimal::new(5263, 2),
            Some(Duration::from_millis(42)),
        );
        assert!(offer.is_successful());
        assert!(offer.error_message().is_none());
        assert!(offer.failure_kind().is_none());
    }

    #[test]
    fn serializes_camel_case_with_latency_ms() {
        let offer = ProviderOffer::successful(
            ProviderId::new("P2"),
            Decimal::new(5263, 0),
            Decimal::new(5263, 2),
            Some(Duration::from_millis(42)),
        );
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["providerId"], "P2");
        assert_eq!(json["success"], true);
        assert_eq!(json["responseLatencyMs"], 42);
        assert!(json.get("errorMessage").is_none());
    }
}
