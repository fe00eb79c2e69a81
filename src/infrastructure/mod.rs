//! # Infrastructure Layer
//!
//! Remote provider integration and observability.

pub mod observability;
pub mod providers;
