//! # Providers
//!
//! Everything needed to get one offer out of one remote provider.
//!
//! - [`codec`]: JSON and XML encoding
//! - [`schema`]: per-provider wire shapes
//! - [`http_client`]: `reqwest` transport
//! - [`client`]: one request/response cycle per provider
//! - [`normalizer`]: outcome to [`ProviderOffer`](crate::domain::entities::ProviderOffer)
//! - [`config`] and [`registry`]: which providers exist

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http_client;
pub mod normalizer;
pub mod registry;
pub mod schema;

pub use client::{HttpProviderClient, Payload, ProviderOutcome, QuoteProvider};
pub use codec::{CodecError, ContentEncoding, WireMessage};
pub use config::{ProviderConfig, ProviderConfigSource, StaticProviderConfigSource};
pub use error::{ProviderError, ProviderResult};
pub use registry::{ConfiguredProviderRegistry, ProviderRegistry};
pub use schema::{ProviderSchema, SchemaKind};
