//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! - [`CurrencyCode`]: validated three-letter currency code
//! - [`ProviderId`]: provider identifier
//! - [`CheckedArithmetic`]: non-panicking decimal arithmetic
//! - [`AggregationState`]: aggregation lifecycle

pub mod aggregation_state;
pub mod arithmetic;
pub mod currency;
pub mod ids;

pub use aggregation_state::{AggregationState, Resolution};
pub use arithmetic::{ArithmeticError, ArithmeticResult, CheckedArithmetic};
pub use currency::CurrencyCode;
pub use ids::ProviderId;
