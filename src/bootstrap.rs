//! # Bootstrap
//!
//! Wires configuration into a ready-to-use best-offer use case.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::{AggregationConfig, HighestAmountSelector, QuoteAggregationEngine};
use crate::application::use_cases::GetBestOfferUseCase;
use crate::application::validation::RequestValidator;
use crate::config::AppConfig;
use crate::infrastructure::observability::{QuoteObserver, TracingObserver};
use crate::infrastructure::providers::ConfiguredProviderRegistry;
use std::sync::Arc;

/// Builds the use case for `config`, returning it with the number of
/// enabled providers.
///
/// # Errors
///
/// Returns `ApplicationError::Configuration` if a provider client cannot be built.
pub fn build_best_offer(config: &AppConfig) -> ApplicationResult<(GetBestOfferUseCase, usize)> {
    let observer: Arc<dyn QuoteObserver> = Arc::new(TracingObserver);
    let registry = ConfiguredProviderRegistry::from_source(config, Arc::clone(&observer))
        .map_err(|e| ApplicationError::configuration(e.to_string()))?;
    let provider_count = registry.len();

    if provider_count == 0 {
        tracing::warn!("no enabled providers configured; every query will fail");
    }

    let engine = QuoteAggregationEngine::new(
        Arc::new(registry),
        Arc::new(HighestAmountSelector::new()),
        observer,
        AggregationConfig::default(),
    );
    let validator = RequestValidator::from_pairs(&config.supported_pairs);

    Ok((
        GetBestOfferUseCase::new(Arc::new(validator), Arc::new(engine)),
        provider_count,
    ))
}
