//! # Best Offer Result
//!
//! The winning offer together with every provider's offer for one request.

use crate::domain::entities::offer::ProviderOffer;
use crate::domain::entities::quote_request::ExchangeQuoteRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of a successful aggregation.
///
/// # Invariants
///
/// - `best_offer` is successful and is a member of `all_offers`.
/// - `best_offer.converted_amount()` is at least the converted amount of
///   every other successful offer.
/// - `all_offers` is in provider configuration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfferResult {
    best_offer: ProviderOffer,
    all_offers: Vec<ProviderOffer>,
    original_request: ExchangeQuoteRequest,
    processed_at: DateTime<Utc>,
}

impl BestOfferResult {
    /// Builds a result whose best offer is `all_offers[best_index]`.
    ///
    /// Returns `None` if the index is out of range or points at a failed
    /// offer.
    #[must_use]
    pub fn new(
        original_request: ExchangeQuoteRequest,
        all_offers: Vec<ProviderOffer>,
        best_index: usize,
    ) -> Option<Self> {
        let best_offer = all_offers
            .get(best_index)
            .filter(|offer| offer.is_successful())
            .cloned()?;
        Some(Self {
            best_offer,
            all_offers,
            original_request,
            processed_at: Utc::now(),
        })
    }

    /// Returns the winning offer.
    #[inline]
    #[must_use]
    pub fn best_offer(&self) -> &ProviderOffer {
        &self.best_offer
    }

    /// Returns every provider's offer in configuration order.
    #[inline]
    #[must_use]
    pub fn all_offers(&self) -> &[ProviderOffer] {
        &self.all_offers
    }

    /// Returns the request that produced this result.
    #[inline]
    #[must_use]
    pub fn original_request(&self) -> &ExchangeQuoteRequest {
        &self.original_request
    }

    /// Returns when the aggregation resolved.
    #[inline]
    #[must_use]
    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    /// Returns the number of providers that produced a usable offer.
    #[must_use]
    pub fn successful_count(&self) -> usize {
        self.all_offers.iter().filter(|o| o.is_successful()).count()
    }
}
