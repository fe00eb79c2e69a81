//! # Application Services
//!
//! - [`QuoteAggregationEngine`]: concurrent offer collection and selection
//! - [`OfferSelector`]: strategies for picking the winning offer

pub mod offer_selection;
pub mod quote_aggregation;

pub use offer_selection::{HighestAmountSelector, OfferSelector};
pub use quote_aggregation::{
    AggregationConfig, AggregationError, AggregationResult, QuoteAggregationEngine,
};
