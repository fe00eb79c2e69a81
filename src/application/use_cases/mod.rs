//! # Use Cases
//!
//! Entry points the API and CLI call into.

pub mod get_best_offer;

pub use get_best_offer::GetBestOfferUseCase;
