//! # Offer Selection
//!
//! Strategies for choosing the winning offer.
//!
//! Selection works on the offers in configuration order and returns an
//! index into that slice, so ties are resolved by position and never by
//! completion order.

use crate::domain::entities::ProviderOffer;
use std::fmt;

/// Trait for offer selection strategies.
pub trait OfferSelector: Send + Sync + fmt::Debug {
    /// Returns the index of the winning successful offer, or `None` if no
    /// offer succeeded.
    fn select(&self, offers: &[ProviderOffer]) -> Option<usize>;

    /// Returns the name of this strategy.
    fn name(&self) -> &'static str;
}

/// Picks the successful offer with the largest converted amount.
///
/// Ties go to the earliest offer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestAmountSelector;

impl HighestAmountSelector {
    /// Creates a new selector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl OfferSelector for HighestAmountSelector {
    fn select(&self, offers: &[ProviderOffer]) -> Option<usize> {
        offers
            .iter()
            .enumerate()
            .filter(|(_, offer)| offer.is_successful())
            .fold(None, |best: Option<(usize, &ProviderOffer)>, (idx, offer)| match best {
                Some((_, current)) if current.converted_amount() >= offer.converted_amount() => {
                    best
                }
                _ => Some((idx, offer)),
            })
            .map(|(idx, _)| idx)
    }

    fn name(&self) -> &'static str {
        "HighestAmount"
    }
}
