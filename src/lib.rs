//! # Exchange Offers
//!
//! Asks every configured currency-exchange provider for a quote at the same
//! time and returns the one that delivers the most target currency.
//!
//! Providers speak different wire shapes (JSON or XML, rate or total). Each
//! one is called exactly once per request under its own deadline; failures
//! are absorbed per provider, and the winner is chosen only from the offers
//! that succeeded.
//!
//! # Layers
//!
//! - [`domain`]: requests, offers, and value objects
//! - [`application`]: validation, aggregation, and the result envelope
//! - [`infrastructure`]: provider clients, codecs, and observability
//! - [`api`]: REST surface
//! - [`config`]: layered settings
//!
//! # Examples
//!
//! ```ignore
//! use exchange_offers::bootstrap::build_best_offer;
//! use exchange_offers::config::AppConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = AppConfig::load()?;
//! let (best_offer, _) = build_best_offer(&config)?;
//! let (status, envelope) = best_offer.handle(&query, &CancellationToken::new()).await;
//! ```

pub mod api;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod infrastructure;
