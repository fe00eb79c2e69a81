//! # Quote Aggregation Engine
//!
//! Fans one request out to every available provider, waits for all of them
//! to settle, and picks the best offer.
//!
//! Each provider runs as its own tokio task under its own deadline and the
//! caller's [`CancellationToken`]. No task can block or cancel another; the
//! join waits for every task. Offers are kept in configuration order no
//! matter which provider answered first.
//!
//! # Examples
//!
//! ```ignore
//! use exchange_offers::application::services::QuoteAggregationEngine;
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = QuoteAggregationEngine::with_defaults(registry);
//! let envelope = engine.best_offer(&request, &CancellationToken::new()).await;
//! ```

use crate::application::envelope::{
    ALL_FAILED_DETAIL, INTERNAL_ERROR, NO_PROVIDERS, NO_QUOTES, QUERY_SUCCEEDED, ResultEnvelope,
};
use crate::application::services::offer_selection::{HighestAmountSelector, OfferSelector};
use crate::domain::entities::{BestOfferResult, ExchangeQuoteRequest, OfferFailure, ProviderOffer};
use crate::domain::value_objects::{AggregationState, Resolution};
use crate::infrastructure::observability::{QuoteObserver, TracingObserver};
use crate::infrastructure::providers::{ProviderRegistry, QuoteProvider};
use futures::FutureExt;
use futures::future::join_all;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Configuration for quote aggregation.
#[derive(Debug, Clone, Default)]
pub struct AggregationConfig {
    /// Deadline applied to every provider instead of its own, in milliseconds.
    pub per_provider_timeout_ms: Option<u64>,
}

impl AggregationConfig {
    /// Overrides every provider's deadline.
    #[must_use]
    pub fn with_per_provider_timeout(mut self, timeout_ms: u64) -> Self {
        self.per_provider_timeout_ms = Some(timeout_ms);
        self
    }

    fn deadline_for(&self, provider: &dyn QuoteProvider) -> Duration {
        self.per_provider_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| provider.timeout())
    }
}

/// Error type for aggregation operations.
#[derive(Debug, Clone, Error)]
pub enum AggregationError {
    /// No provider is enabled; nothing was dispatched.
    #[error("no providers available")]
    NoProvidersAvailable,

    /// Every provider failed.
    #[error("all providers failed ({} offers)", offers.len())]
    AllProvidersFailed {
        /// The failed offers, in configuration order.
        offers: Vec<ProviderOffer>,
    },

    /// Unexpected fault outside any single provider.
    #[error("internal aggregation fault: {0}")]
    Internal(String),
}

impl AggregationError {
    /// Converts the error into the envelope callers see.
    ///
    /// Per-provider detail is not included.
    #[must_use]
    pub fn to_envelope<T>(&self) -> ResultEnvelope<T> {
        match self {
            Self::NoProvidersAvailable => {
                ResultEnvelope::failure(NO_PROVIDERS, "no enabled providers are configured")
            }
            Self::AllProvidersFailed { .. } => ResultEnvelope::failure(NO_QUOTES, ALL_FAILED_DETAIL),
            Self::Internal(_) => {
                ResultEnvelope::failure(INTERNAL_ERROR, "unexpected fault during aggregation")
            }
        }
    }
}

/// Result type for aggregation operations.
pub type AggregationResult<T> = Result<T, AggregationError>;

/// Engine that collects offers from every provider and selects the best.
#[derive(Debug)]
pub struct QuoteAggregationEngine {
    registry: Arc<dyn ProviderRegistry>,
    selector: Arc<dyn OfferSelector>,
    observer: Arc<dyn QuoteObserver>,
    config: AggregationConfig,
}

impl QuoteAggregationEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        registry: Arc<dyn ProviderRegistry>,
        selector: Arc<dyn OfferSelector>,
        observer: Arc<dyn QuoteObserver>,
        config: AggregationConfig,
    ) -> Self {
        Self {
            registry,
            selector,
            observer,
            config,
        }
    }

    /// Creates an engine that picks the highest amount and logs via `tracing`.
    #[must_use]
    pub fn with_defaults(registry: Arc<dyn ProviderRegistry>) -> Self {
        Self::new(
            registry,
            Arc::new(HighestAmountSelector::new()),
            Arc::new(TracingObserver),
            AggregationConfig::default(),
        )
    }

    /// Runs one aggregation and wraps the outcome in an envelope.
    ///
    /// `request.amount()` must already be validated as positive.
    pub async fn best_offer(
        &self,
        request: &ExchangeQuoteRequest,
        cancel: &CancellationToken,
    ) -> ResultEnvelope<BestOfferResult> {
        match self.try_best_offer(request, cancel).await {
            Ok(result) => ResultEnvelope::success(QUERY_SUCCEEDED, result),
            Err(e) => e.to_envelope(),
        }
    }

    /// Runs one aggregation.
    ///
    /// # Errors
    ///
    /// - `AggregationError::NoProvidersAvailable` if nothing is enabled
    /// - `AggregationError::AllProvidersFailed` if no offer succeeded
    /// - `AggregationError::Internal` on an unexpected fault
    pub async fn try_best_offer(
        &self,
        request: &ExchangeQuoteRequest,
        cancel: &CancellationToken,
    ) -> AggregationResult<BestOfferResult> {
        let aggregation_id = Uuid::new_v4();
        let span = tracing::info_span!("aggregation", %aggregation_id, request = %request);

        AssertUnwindSafe(self.aggregate(request, cancel))
            .catch_unwind()
            .instrument(span)
            .await
            .unwrap_or_else(|panic| {
                let message = panic_message(panic.as_ref());
                tracing::error!(error = %message, "aggregation fault");
                self.observer.aggregation_failed(&message);
                Err(AggregationError::Internal(message))
            })
    }

    async fn aggregate(
        &self,
        request: &ExchangeQuoteRequest,
        cancel: &CancellationToken,
    ) -> AggregationResult<BestOfferResult> {
        let providers = self.registry.available_providers();
        if providers.is_empty() {
            self.observer.aggregation_failed(NO_PROVIDERS);
            return Err(AggregationError::NoProvidersAvailable);
        }

        // Dropping this future cancels every unit still in flight.
        let cancel = cancel.child_token();
        let _abandon_guard = cancel.clone().drop_guard();

        let mut state = AggregationState::Idle;
        self.transition(
            &mut state,
            AggregationState::Dispatched {
                providers: providers.len(),
            },
        );

        let handles: Vec<_> = providers
            .iter()
            .map(|provider| self.spawn_unit(Arc::clone(provider), request.clone(), cancel.clone()))
            .collect();

        self.transition(&mut state, AggregationState::AwaitingAll);

        let offers: Vec<ProviderOffer> = join_all(handles)
            .await
            .into_iter()
            .zip(&providers)
            .map(|(joined, provider)| {
                joined.unwrap_or_else(|e| {
                    ProviderOffer::failed(
                        provider.provider_id().clone(),
                        OfferFailure::Fault,
                        format!("provider task failed: {e}"),
                        None,
                    )
                })
            })
            .collect();

        for offer in &offers {
            self.observer.offer_normalized(offer);
        }

        let Some(best_index) = self.selector.select(&offers) else {
            self.transition(&mut state, AggregationState::Resolved(Resolution::AllFailed));
            self.observer.aggregation_failed(ALL_FAILED_DETAIL);
            return Err(AggregationError::AllProvidersFailed { offers });
        };

        let candidates = offers.iter().filter(|o| o.is_successful()).count();
        let result = BestOfferResult::new(request.clone(), offers, best_index).ok_or_else(|| {
            AggregationError::Internal(format!(
                "selector '{}' chose unusable offer {best_index}",
                self.selector.name()
            ))
        })?;

        self.transition(&mut state, AggregationState::Resolved(Resolution::Success));
        self.observer
            .best_offer_selected(result.best_offer(), candidates);
        Ok(result)
    }

    fn spawn_unit(
        &self,
        provider: Arc<dyn QuoteProvider>,
        request: ExchangeQuoteRequest,
        cancel: CancellationToken,
    ) -> JoinHandle<ProviderOffer> {
        let deadline = self.config.deadline_for(provider.as_ref());
        let provider_id = provider.provider_id().clone();

        let unit = async move {
            let started = Instant::now();
            tokio::select! {
                biased;
                () = cancel.cancelled() => ProviderOffer::failed(
                    provider_id,
                    OfferFailure::Cancelled,
                    "request cancelled by caller",
                    Some(started.elapsed()),
                ),
                settled = timeout(deadline, provider.fetch_offer(&request)) => match settled {
                    Ok(offer) => offer,
                    Err(_) => ProviderOffer::failed(
                        provider_id,
                        OfferFailure::Timeout,
                        format!("no response within {}ms", deadline.as_millis()),
                        Some(started.elapsed()),
                    ),
                },
            }
        };

        tokio::spawn(unit.in_current_span())
    }

    fn transition(&self, state: &mut AggregationState, next: AggregationState) {
        debug_assert!(state.can_transition_to(&next), "{state} -> {next}");
        self.observer.state_changed(*state, next);
        *state = next;
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Returns the selection strategy name.
    #[must_use]
    pub fn selector_name(&self) -> &'static str {
        self.selector.name()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ProviderId;
    use crate::infrastructure::observability::NoopObserver;
    use crate::infrastructure::providers::ConfiguredProviderRegistry;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, Copy)]
    enum Behavior {
        Total(i64),
        Fail,
        Panic,
    }

    #[derive(Debug)]
    struct MockProvider {
        id: ProviderId,
        behavior: Behavior,
        delay_ms: u64,
        timeout: Duration,
    }

    impl MockProvider {
        fn new(id: &str, behavior: Behavior, delay_ms: u64) -> Arc<dyn QuoteProvider> {
            Arc::new(Self {
                id: ProviderId::new(id),
                behavior,
                delay_ms,
                timeout: Duration::from_secs(5),
            })
        }

        fn with_timeout(id: &str, delay_ms: u64, timeout_ms: u64) -> Arc<dyn QuoteProvider> {
            Arc::new(Self {
                id: ProviderId::new(id),
                behavior: Behavior::Total(1),
                delay_ms,
                timeout: Duration::from_millis(timeout_ms),
            })
        }
    }

    #[async_trait]
    impl QuoteProvider for MockProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn fetch_offer(&self, request: &ExchangeQuoteRequest) -> ProviderOffer {
            if self.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            }
            match self.behavior {
                Behavior::Total(total) => {
                    let total = Decimal::new(total, 0);
                    ProviderOffer::successful(
                        self.id.clone(),
                        total,
                        total / request.amount(),
                        Some(Duration::from_millis(self.delay_ms)),
                    )
                }
                Behavior::Fail => ProviderOffer::failed(
                    self.id.clone(),
                    OfferFailure::HttpStatus,
                    "provider returned HTTP 503: Service Unavailable",
                    None,
                ),
                Behavior::Panic => panic!("provider exploded"),
            }
        }
    }

    #[derive(Debug)]
    struct CompletionFlagProvider {
        id: ProviderId,
        delay: Duration,
        completed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl QuoteProvider for CompletionFlagProvider {
        fn provider_id(&self) -> &ProviderId {
            &self.id
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        async fn fetch_offer(&self, request: &ExchangeQuoteRequest) -> ProviderOffer {
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
            ProviderOffer::successful(self.id.clone(), Decimal::ONE, Decimal::ONE / request.amount(), None)
        }
    }

    #[derive(Debug, Default)]
    struct RecordingObserver {
        states: Mutex<Vec<AggregationState>>,
    }

    impl QuoteObserver for RecordingObserver {
        fn state_changed(&self, _from: AggregationState, to: AggregationState) {
            self.states.lock().unwrap().push(to);
        }
    }

    fn request() -> ExchangeQuoteRequest {
        ExchangeQuoteRequest::parse("USD", "DOP", Decimal::new(100, 0)).unwrap()
    }

    fn engine(providers: Vec<Arc<dyn QuoteProvider>>) -> QuoteAggregationEngine {
        QuoteAggregationEngine::new(
            Arc::new(ConfiguredProviderRegistry::new(providers)),
            Arc::new(HighestAmountSelector::new()),
            Arc::new(NoopObserver),
            AggregationConfig::default(),
        )
    }

    fn ids(offers: &[ProviderOffer]) -> Vec<String> {
        offers.iter().map(|o| o.provider_id().to_string()).collect()
    }

    #[tokio::test]
    async fn picks_highest_amount() {
        let engine = engine(vec![
            MockProvider::new("P1", Behavior::Total(5550), 0),
            MockProvider::new("P2", Behavior::Total(5263), 0),
            MockProvider::new("P3", Behavior::Total(5882), 0),
        ]);

        let envelope = engine.best_offer(&request(), &CancellationToken::new()).await;
        assert!(envelope.is_successful());
        assert_eq!(envelope.message(), QUERY_SUCCEEDED);

        let result = envelope.into_data().unwrap();
        assert_eq!(result.best_offer().provider_id().as_str(), "P3");
        assert_eq!(result.best_offer().converted_amount(), Decimal::new(5882, 0));
        assert_eq!(result.all_offers().len(), 3);
    }

    #[tokio::test]
    async fn offers_keep_configuration_order() {
        let engine = engine(vec![
            MockProvider::new("SLOW", Behavior::Total(100), 80),
            MockProvider::new("FAST", Behavior::Total(100), 0),
        ]);

        let result = engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(ids(result.all_offers()), vec!["SLOW", "FAST"]);
        assert_eq!(result.best_offer().provider_id().as_str(), "SLOW");
    }

    #[tokio::test]
    async fn all_failed() {
        let engine = engine(vec![
            MockProvider::new("P1", Behavior::Fail, 0),
            MockProvider::new("P2", Behavior::Fail, 0),
        ]);

        let error = engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        match &error {
            AggregationError::AllProvidersFailed { offers } => assert_eq!(offers.len(), 2),
            other => panic!("unexpected error: {other}"),
        }

        let envelope = error.to_envelope::<BestOfferResult>();
        assert_eq!(envelope.message(), NO_QUOTES);
        assert_eq!(envelope.error_detail(), Some(ALL_FAILED_DETAIL));
    }

    #[tokio::test]
    async fn no_providers_never_dispatches() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = QuoteAggregationEngine::new(
            Arc::new(ConfiguredProviderRegistry::default()),
            Arc::new(HighestAmountSelector::new()),
            observer.clone(),
            AggregationConfig::default(),
        );

        let envelope = engine.best_offer(&request(), &CancellationToken::new()).await;
        assert_eq!(envelope.message(), NO_PROVIDERS);
        assert!(observer.states.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn slow_provider_times_out_alone() {
        let engine = engine(vec![
            MockProvider::with_timeout("SLOW", 500, 30),
            MockProvider::new("FAST", Behavior::Total(5263), 0),
        ]);

        let result = engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap();
        let slow = &result.all_offers()[0];
        assert!(!slow.is_successful());
        assert_eq!(slow.failure_kind(), Some(OfferFailure::Timeout));
        assert_eq!(result.best_offer().provider_id().as_str(), "FAST");
    }

    #[tokio::test]
    async fn per_provider_timeout_override() {
        let engine = QuoteAggregationEngine::new(
            Arc::new(ConfiguredProviderRegistry::new(vec![MockProvider::new(
                "SLOW",
                Behavior::Total(1),
                300,
            )])),
            Arc::new(HighestAmountSelector::new()),
            Arc::new(NoopObserver),
            AggregationConfig::default().with_per_provider_timeout(20),
        );

        let error = engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(error, AggregationError::AllProvidersFailed { .. }));
    }

    #[tokio::test]
    async fn cancellation_resolves_every_unit() {
        let engine = engine(vec![
            MockProvider::new("P1", Behavior::Total(5550), 500),
            MockProvider::new("P2", Behavior::Total(5263), 500),
        ]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let error = engine.try_best_offer(&request(), &cancel).await.unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(400));

        let AggregationError::AllProvidersFailed { offers } = error else {
            panic!("expected all providers to fail");
        };
        assert_eq!(offers.len(), 2);
        assert!(
            offers
                .iter()
                .all(|o| o.failure_kind() == Some(OfferFailure::Cancelled))
        );
    }

    #[tokio::test]
    async fn panicking_provider_becomes_fault_offer() {
        let engine = engine(vec![
            MockProvider::new("BOOM", Behavior::Panic, 0),
            MockProvider::new("OK", Behavior::Total(5263), 0),
        ]);

        let result = engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap();
        let boom = &result.all_offers()[0];
        assert_eq!(boom.failure_kind(), Some(OfferFailure::Fault));
        assert!(boom.error_message().unwrap().contains("provider task failed"));
        assert_eq!(result.successful_count(), 1);
    }

    #[tokio::test]
    async fn state_transitions_are_recorded() {
        let observer = Arc::new(RecordingObserver::default());
        let engine = QuoteAggregationEngine::new(
            Arc::new(ConfiguredProviderRegistry::new(vec![MockProvider::new(
                "P1",
                Behavior::Total(10),
                0,
            )])),
            Arc::new(HighestAmountSelector::new()),
            observer.clone(),
            AggregationConfig::default(),
        );

        engine
            .try_best_offer(&request(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            *observer.states.lock().unwrap(),
            vec![
                AggregationState::Dispatched { providers: 1 },
                AggregationState::AwaitingAll,
                AggregationState::Resolved(Resolution::Success),
            ]
        );
    }

    #[tokio::test]
    async fn dropping_aggregation_cancels_units() {
        let completed = Arc::new(AtomicBool::new(false));
        let provider: Arc<dyn QuoteProvider> = Arc::new(CompletionFlagProvider {
            id: ProviderId::new("SLOW"),
            delay: Duration::from_millis(300),
            completed: Arc::clone(&completed),
        });
        let engine = engine(vec![provider]);
        let caller = CancellationToken::new();

        let abandoned = timeout(
            Duration::from_millis(20),
            engine.try_best_offer(&request(), &caller),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!completed.load(Ordering::SeqCst));
        assert!(!caller.is_cancelled());
    }

    #[test]
    fn panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
