//! # Application Configuration
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `config/default.toml`, if present
//! 3. the file named by `EXCHANGE_OFFERS_CONFIG`, if set
//! 4. environment variables prefixed `EXCHANGE_OFFERS__`, with `__`
//!    separating nested keys (`EXCHANGE_OFFERS__SERVER__PORT=9000`)
//!
//! A `.env` file is loaded into the environment first.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::config::AppConfig;
//!
//! let config = AppConfig::from_toml(r#"
//!     supported_pairs = ["USD_DOP"]
//!
//!     [[providers]]
//!     provider_id = "MOCK_API_1"
//!     base_url = "http://localhost:5001/api/exchange"
//!     schema = "rate"
//! "#).unwrap();
//!
//! assert_eq!(config.server.port, 8080);
//! assert_eq!(config.providers.len(), 1);
//! ```

use crate::infrastructure::observability::LogFormat;
use crate::infrastructure::providers::config::{ProviderConfig, ProviderConfigSource};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an extra configuration file.
pub const CONFIG_FILE_ENV: &str = "EXCHANGE_OFFERS_CONFIG";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "EXCHANGE_OFFERS";

const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// Settings were read but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Log output format.
    pub log_format: LogFormat,
    /// Providers in configuration order.
    pub providers: Vec<ProviderConfig>,
    /// Supported `SOURCE_TARGET` currency pairs.
    pub supported_pairs: Vec<String>,
    /// `.env` file loaded into the environment, if any. Loading happens
    /// before logging is set up, so binaries report it afterwards.
    #[serde(skip)]
    pub dotenv_path: Option<PathBuf>,
}

impl AppConfig {
    /// Loads configuration from every layer.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is unreadable and
    /// `ConfigError::Invalid` if the merged settings are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Loads configuration, using `extra_file` in place of the file named by
    /// `EXCHANGE_OFFERS_CONFIG` when given.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with(extra_file: Option<&str>) -> Result<Self, ConfigError> {
        let dotenv_path = dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));

        let extra_file = extra_file
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok());
        if let Some(path) = extra_file {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        let mut config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("supported_pairs"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        config.dotenv_path = dotenv_path;
        Ok(config)
    }

    /// Parses configuration from a TOML document, without other layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is malformed or inconsistent.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks providers and supported pairs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for provider in &self.providers {
            provider
                .validate()
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            if !seen.insert(provider.provider_id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate provider id '{}'",
                    provider.provider_id
                )));
            }
        }

        for pair in &self.supported_pairs {
            let valid = pair
                .split_once('_')
                .is_some_and(|(source, target)| is_code(source) && is_code(target));
            if !valid {
                return Err(ConfigError::Invalid(format!(
                    "supported pair '{pair}' must look like USD_EUR"
                )));
            }
        }
        Ok(())
    }
}

impl ProviderConfigSource for AppConfig {
    fn provider_configs(&self) -> Vec<ProviderConfig> {
        self.providers.clone()
    }
}

fn is_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::codec::ContentEncoding;
    use crate::infrastructure::providers::schema::SchemaKind;

    const SAMPLE: &str = r#"
        log_format = "json"
        supported_pairs = ["USD_DOP", "EUR_USD"]

        [server]
        port = 9000

        [[providers]]
        provider_id = "MOCK_API_1"
        base_url = "http://localhost:5001/api/exchange"
        schema = "rate"
        timeout_seconds = 2.5

        [[providers]]
        provider_id = "MOCK_API_2"
        base_url = "http://localhost:5002/api/exchange"
        schema = "total"
        enabled = false
    "#;

    #[test]
    fn parses_sample() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.server.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].timeout_seconds, 2.5);
        assert_eq!(config.providers[1].schema, SchemaKind::Total);
        assert_eq!(config.providers[1].content_encoding(), ContentEncoding::Xml);
        assert_eq!(config.enabled_providers().len(), 1);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn inline_documents_load_no_dotenv() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        assert!(config.dotenv_path.is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let document = r#"
            [[providers]]
            provider_id = "A"
            base_url = "http://a"
            schema = "rate"

            [[providers]]
            provider_id = "A"
            base_url = "http://b"
            schema = "total"
        "#;
        let error = AppConfig::from_toml(document).unwrap_err();
        assert!(error.to_string().contains("duplicate provider id"));
    }

    #[test]
    fn rejects_unknown_schema() {
        let document = r#"
            [[providers]]
            provider_id = "A"
            base_url = "http://a"
            schema = "soap"
        "#;
        assert!(matches!(AppConfig::from_toml(document), Err(ConfigError::Load(_))));
    }

    #[test]
    fn rejects_malformed_pair() {
        let error = AppConfig::from_toml(r#"supported_pairs = ["USDEUR"]"#).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }
}
