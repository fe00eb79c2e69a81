//! # API Layer
//!
//! External interfaces.

pub mod rest;
