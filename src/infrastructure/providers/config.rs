//! # Provider Configuration
//!
//! Static description of each remote provider and the [`ProviderConfigSource`]
//! seam the registry reads it through.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::infrastructure::providers::config::ProviderConfig;
//! use exchange_offers::infrastructure::providers::schema::SchemaKind;
//!
//! let config = ProviderConfig::new("MOCK_API_2", "http://localhost:5002/api/exchange", SchemaKind::Total)
//!     .with_timeout(5.0);
//!
//! assert_eq!(config.timeout().as_secs(), 5);
//! assert_eq!(config.content_encoding().as_str(), "xml");
//! ```

use crate::domain::value_objects::ProviderId;
use crate::infrastructure::providers::codec::ContentEncoding;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::schema::SchemaKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-provider timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: f64 = 30.0;

/// Configuration for one remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider identifier.
    pub provider_id: ProviderId,
    /// Endpoint that receives the quote request.
    pub base_url: String,
    /// Per-call deadline in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
    /// Wire encoding. Defaults to the schema's usual encoding when omitted.
    #[serde(default)]
    pub content_encoding: Option<ContentEncoding>,
    /// Wire shape the provider speaks.
    pub schema: SchemaKind,
    /// Disabled providers are never called.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_timeout_seconds() -> f64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_enabled() -> bool {
    true
}

impl ProviderConfig {
    /// Creates an enabled provider with the default timeout.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, base_url: impl Into<String>, schema: SchemaKind) -> Self {
        Self {
            provider_id: ProviderId::new(provider_id),
            base_url: base_url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            content_encoding: None,
            schema,
            enabled: true,
        }
    }

    /// Sets the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Overrides the content encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: ContentEncoding) -> Self {
        self.content_encoding = Some(encoding);
        self
    }

    /// Enables or disables the provider.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the effective content encoding.
    #[must_use]
    pub fn content_encoding(&self) -> ContentEncoding {
        self.content_encoding
            .unwrap_or_else(|| self.schema.default_encoding())
    }

    /// Returns the timeout as a duration. Invalid values fall back to the default.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(30))
    }

    /// Checks the endpoint URL and timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidConfig` describing the first problem found.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.provider_id.as_str().trim().is_empty() {
            return Err(ProviderError::invalid_config("provider_id must not be empty"));
        }
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| {
            ProviderError::invalid_config(format!(
                "{}: invalid base_url '{}': {}",
                self.provider_id, self.base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProviderError::invalid_config(format!(
                "{}: base_url must be http or https",
                self.provider_id
            )));
        }
        if !self.timeout_seconds.is_finite() || self.timeout_seconds <= 0.0 {
            return Err(ProviderError::invalid_config(format!(
                "{}: timeout_seconds must be positive",
                self.provider_id
            )));
        }
        Ok(())
    }
}

/// Source of provider configuration.
pub trait ProviderConfigSource: Send + Sync {
    /// Returns every configured provider in configuration order.
    fn provider_configs(&self) -> Vec<ProviderConfig>;

    /// Returns the enabled providers in configuration order.
    fn enabled_providers(&self) -> Vec<ProviderConfig> {
        self.provider_configs()
            .into_iter()
            .filter(|config| config.enabled)
            .collect()
    }
}

/// In-memory configuration source.
#[derive(Debug, Clone, Default)]
pub struct StaticProviderConfigSource {
    configs: Vec<ProviderConfig>,
}

impl StaticProviderConfigSource {
    /// Creates a source over the given providers.
    #[must_use]
    pub fn new(configs: Vec<ProviderConfig>) -> Self {
        Self { configs }
    }
}

impl ProviderConfigSource for StaticProviderConfigSource {
    fn provider_configs(&self) -> Vec<ProviderConfig> {
        self.configs.clone()
    }
}
