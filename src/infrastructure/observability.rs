//! # Observability
//!
//! Aggregation progress is reported through an injected [`QuoteObserver`]
//! rather than logged from inside the aggregation logic. [`TracingObserver`]
//! turns each notification into a structured `tracing` event;
//! [`NoopObserver`] discards them.
//!
//! [`init_tracing`] installs the process-wide subscriber for the binaries.

use crate::domain::entities::ProviderOffer;
use crate::domain::value_objects::{AggregationState, ProviderId};
use crate::infrastructure::providers::codec::ContentEncoding;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,exchange_offers=debug";

/// Receives aggregation progress notifications.
///
/// Every method has a no-op default so implementors pick what they need.
pub trait QuoteObserver: Send + Sync + fmt::Debug {
    /// The aggregation moved between lifecycle states.
    fn state_changed(&self, _from: AggregationState, _to: AggregationState) {}

    /// A request is about to be sent to a provider.
    fn request_sent(&self, _provider: &ProviderId, _encoding: ContentEncoding) {}

    /// A provider's outcome was normalized into an offer.
    fn offer_normalized(&self, _offer: &ProviderOffer) {}

    /// A winning offer was chosen from `candidates` successful offers.
    fn best_offer_selected(&self, _offer: &ProviderOffer, _candidates: usize) {}

    /// The aggregation ended without a winner.
    fn aggregation_failed(&self, _reason: &str) {}
}

/// Observer that discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl QuoteObserver for NoopObserver {}

/// Observer that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl QuoteObserver for TracingObserver {
    fn state_changed(&self, from: AggregationState, to: AggregationState) {
        tracing::debug!(from = %from, to = %to, "aggregation state changed");
    }

    fn request_sent(&self, provider: &ProviderId, encoding: ContentEncoding) {
        tracing::debug!(provider = %provider, encoding = %encoding, "sending provider request");
    }

    fn offer_normalized(&self, offer: &ProviderOffer) {
        let latency_ms = offer.response_latency().map(|l| l.as_millis());
        match offer.failure_kind() {
            None => tracing::info!(
                provider = %offer.provider_id(),
                converted_amount = %offer.converted_amount(),
                implied_rate = %offer.implied_rate(),
                latency_ms,
                "provider offer received"
            ),
            Some(kind) if kind.is_payload() => tracing::warn!(
                provider = %offer.provider_id(),
                kind = %kind,
                error = offer.error_message().unwrap_or_default(),
                latency_ms,
                "provider answered with unusable payload"
            ),
            Some(kind) => tracing::warn!(
                provider = %offer.provider_id(),
                kind = %kind,
                error = offer.error_message().unwrap_or_default(),
                latency_ms,
                "provider failed"
            ),
        }
    }

    fn best_offer_selected(&self, offer: &ProviderOffer, candidates: usize) {
        tracing::info!(
            provider = %offer.provider_id(),
            converted_amount = %offer.converted_amount(),
            candidates,
            "best offer selected"
        );
    }

    fn aggregation_failed(&self, reason: &str) {
        tracing::warn!(reason, "aggregation produced no offer");
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(log_fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Text => registry
            .with(log_fmt::layer().with_target(true))
            .try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OfferFailure;
    use rust_decimal::Decimal;

    #[test]
    fn observers_accept_every_notification() {
        let ok = ProviderOffer::successful(
            ProviderId::new("MOCK_API_1"),
            Decimal::new(5550, 0),
            Decimal::new(555, 1),
            None,
        );
        let failed = ProviderOffer::failed(
            ProviderId::new("MOCK_API_2"),
            OfferFailure::Payload,
            "missing field",
            None,
        );
        let observers: [&dyn QuoteObserver; 2] = [&TracingObserver, &NoopObserver];
        for observer in observers {
            observer.state_changed(AggregationState::Idle, AggregationState::AwaitingAll);
            observer.request_sent(ok.provider_id(), ContentEncoding::Json);
            observer.offer_normalized(&ok);
            observer.offer_normalized(&failed);
            observer.best_offer_selected(&ok, 1);
            observer.aggregation_failed("all providers failed");
        }
    }

    #[test]
    fn log_format_deserializes_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap_or_default();
        assert_eq!(format, LogFormat::Json);
        assert_eq!(LogFormat::default(), LogFormat::Text);
    }
}
