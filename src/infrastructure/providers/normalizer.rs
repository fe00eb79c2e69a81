//! # Offer Normalizer
//!
//! Folds a [`ProviderOutcome`] into a [`ProviderOffer`]. Pure and
//! infallible: every outcome, good or bad, yields exactly one offer.
//!
//! | Outcome | Offer |
//! |---------|-------|
//! | `Failure` | failed, kind from the transport error |
//! | `Success` + undecodable body | failed, [`OfferFailure::Payload`] |
//! | `Success` + missing or bad field | failed, [`OfferFailure::Payload`] |
//! | `Success` + usable total | successful, `implied_rate = total / amount` |

use crate::domain::entities::{OfferFailure, ProviderOffer};
use crate::domain::value_objects::{CheckedArithmetic, ProviderId};
use crate::infrastructure::providers::client::{Payload, ProviderOutcome};
use crate::infrastructure::providers::schema::ProviderSchema;
use rust_decimal::Decimal;

/// Largest allowed gap between the implied rate and a provider-reported rate.
pub const RATE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Normalizes one provider outcome for a request of `amount`.
#[must_use]
pub fn normalize<S: ProviderSchema>(
    provider_id: ProviderId,
    amount: Decimal,
    outcome: ProviderOutcome<S::Response>,
) -> ProviderOffer {
    match outcome {
        ProviderOutcome::Failure { error, latency } => {
            ProviderOffer::failed(provider_id, error.failure_kind(), error.to_string(), latency)
        }
        ProviderOutcome::Success {
            payload: Payload::Undecodable(error),
            status,
            latency,
        } => ProviderOffer::failed(
            provider_id,
            OfferFailure::Payload,
            format!("HTTP {status} with unusable payload: {error}"),
            Some(latency),
        ),
        ProviderOutcome::Success {
            payload: Payload::Decoded(response),
            latency,
            ..
        } => match price::<S>(&response, amount) {
            Ok((converted, implied)) => {
                ProviderOffer::successful(provider_id, converted, implied, Some(latency))
            }
            Err(message) => {
                ProviderOffer::failed(provider_id, OfferFailure::Payload, message, Some(latency))
            }
        },
    }
}

fn price<S: ProviderSchema>(
    response: &S::Response,
    amount: Decimal,
) -> Result<(Decimal, Decimal), String> {
    if amount <= Decimal::ZERO {
        return Err(format!("requested amount {amount} is not positive"));
    }

    let quote = S::extract(response, amount).map_err(|e| e.to_string())?;
    if quote.converted_total <= Decimal::ZERO {
        return Err(format!(
            "provider quoted non-positive amount {}",
            quote.converted_total
        ));
    }

    let implied = quote
        .converted_total
        .safe_div(amount)
        .map_err(|e| format!("cannot derive implied rate: {e}"))?;

    if let Some(reported) = quote.reported_rate
        && (implied - reported).abs() > RATE_TOLERANCE
    {
        return Err(format!(
            "implied rate {implied} disagrees with reported rate {reported}"
        ));
    }

    Ok((quote.converted_total, implied))
}
