//! # Provider Registry
//!
//! Turns configuration into the ordered list of providers the aggregator
//! fans out to.

use crate::infrastructure::observability::QuoteObserver;
use crate::infrastructure::providers::client::{HttpProviderClient, QuoteProvider};
use crate::infrastructure::providers::config::{ProviderConfig, ProviderConfigSource};
use crate::infrastructure::providers::error::ProviderResult;
use crate::infrastructure::providers::schema::{
    NestedTotalSchema, RateSchema, SchemaKind, TotalSchema,
};
use std::fmt;
use std::sync::Arc;

/// Supplies the providers for one aggregation, in configuration order.
pub trait ProviderRegistry: Send + Sync + fmt::Debug {
    /// Returns the enabled providers in configuration order.
    fn available_providers(&self) -> Vec<Arc<dyn QuoteProvider>>;
}

/// Registry over a fixed list of providers.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredProviderRegistry {
    providers: Vec<Arc<dyn QuoteProvider>>,
}

impl ConfiguredProviderRegistry {
    /// Creates a registry over already-built providers.
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        Self { providers }
    }

    /// Builds an HTTP client for every enabled provider in `source`.
    ///
    /// # Errors
    ///
    /// Returns the first provider configuration or client construction error.
    pub fn from_source(
        source: &dyn ProviderConfigSource,
        observer: Arc<dyn QuoteObserver>,
    ) -> ProviderResult<Self> {
        let providers = source
            .enabled_providers()
            .into_iter()
            .map(|config| build_client(config, Arc::clone(&observer)))
            .collect::<ProviderResult<Vec<_>>>()?;

        tracing::debug!(count = providers.len(), "provider registry built");
        Ok(Self { providers })
    }

    /// Returns the number of providers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if no provider is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderRegistry for ConfiguredProviderRegistry {
    fn available_providers(&self) -> Vec<Arc<dyn QuoteProvider>> {
        self.providers.clone()
    }
}

fn build_client(
    config: ProviderConfig,
    observer: Arc<dyn QuoteObserver>,
) -> ProviderResult<Arc<dyn QuoteProvider>> {
    let provider: Arc<dyn QuoteProvider> = match config.schema {
        SchemaKind::Rate => Arc::new(HttpProviderClient::<RateSchema>::new(config, observer)?),
        SchemaKind::Total => Arc::new(HttpProviderClient::<TotalSchema>::new(config, observer)?),
        SchemaKind::NestedTotal => {
            Arc::new(HttpProviderClient::<NestedTotalSchema>::new(config, observer)?)
        }
    };
    Ok(provider)
}
