//! # Domain Entities
//!
//! - [`ExchangeQuoteRequest`]: the generic conversion request
//! - [`ProviderOffer`]: one provider's normalized offer
//! - [`BestOfferResult`]: the winning offer plus every provider's offer

pub mod best_offer;
pub mod offer;
pub mod quote_request;

pub use best_offer::BestOfferResult;
pub use offer::{OfferFailure, ProviderOffer};
pub use quote_request::ExchangeQuoteRequest;
