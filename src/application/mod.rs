//! # Application Layer
//!
//! Validation, aggregation, and the envelope returned to callers.

pub mod envelope;
pub mod error;
pub mod services;
pub mod use_cases;
pub mod validation;

pub use envelope::ResultEnvelope;
pub use error::{ApplicationError, ApplicationResult};
