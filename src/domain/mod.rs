//! # Domain Layer
//!
//! Requests, offers, and the value objects they are built from. Nothing in
//! this layer performs I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
