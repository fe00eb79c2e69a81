//! End-to-end aggregation over three simulated providers.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use exchange_offers::application::envelope::{ALL_FAILED_DETAIL, NO_QUOTES, QUERY_SUCCEEDED};
use exchange_offers::application::services::{
    AggregationConfig, AggregationError, HighestAmountSelector, QuoteAggregationEngine,
};
use exchange_offers::domain::entities::{ExchangeQuoteRequest, OfferFailure};
use exchange_offers::infrastructure::observability::NoopObserver;
use exchange_offers::infrastructure::providers::schema::SchemaKind;
use exchange_offers::infrastructure::providers::{
    ConfiguredProviderRegistry, ProviderConfig, StaticProviderConfigSource,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RATE_ROUTE: &str = "/api/mock1/convert-currency";
const TOTAL_ROUTE: &str = "/api/mock2/convert";
const NESTED_ROUTE: &str = "/api/mock3/convert";

fn request() -> ExchangeQuoteRequest {
    ExchangeQuoteRequest::parse("USD", "DOP", Decimal::new(100, 0)).unwrap()
}

fn rate_reply(rate: f64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"rate": rate}))
}

fn total_reply(total: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<ExchangeResult><Result>{total}</Result></ExchangeResult>"),
        "application/xml",
    )
}

fn nested_reply(total: u32) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "statusCode": 200,
        "message": "ok",
        "data": {"total": total}
    }))
}

fn unavailable() -> ResponseTemplate {
    ResponseTemplate::new(503).set_body_string("Service Unavailable")
}

async fn mount(server: &MockServer, route: &str, reply: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(reply)
        .mount(server)
        .await;
}

fn providers(server: &MockServer) -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new("MOCK_API_1", format!("{}{RATE_ROUTE}", server.uri()), SchemaKind::Rate),
        ProviderConfig::new("MOCK_API_2", format!("{}{TOTAL_ROUTE}", server.uri()), SchemaKind::Total),
        ProviderConfig::new(
            "MOCK_API_3",
            format!("{}{NESTED_ROUTE}", server.uri()),
            SchemaKind::NestedTotal,
        ),
    ]
}

fn engine(configs: Vec<ProviderConfig>) -> QuoteAggregationEngine {
    engine_with(configs, AggregationConfig::default())
}

fn engine_with(configs: Vec<ProviderConfig>, config: AggregationConfig) -> QuoteAggregationEngine {
    let registry = ConfiguredProviderRegistry::from_source(
        &StaticProviderConfigSource::new(configs),
        Arc::new(NoopObserver),
    )
    .unwrap();
    QuoteAggregationEngine::new(
        Arc::new(registry),
        Arc::new(HighestAmountSelector::new()),
        Arc::new(NoopObserver),
        config,
    )
}

#[tokio::test]
async fn scenario_all_succeed_picks_highest() {
    let server = MockServer::start().await;
    mount(&server, RATE_ROUTE, rate_reply(55.5)).await;
    mount(&server, TOTAL_ROUTE, total_reply(5263)).await;
    mount(&server, NESTED_ROUTE, nested_reply(5882)).await;

    let envelope = engine(providers(&server))
        .best_offer(&request(), &CancellationToken::new())
        .await;
    assert!(envelope.is_successful());
    assert_eq!(envelope.message(), QUERY_SUCCEEDED);

    let result = envelope.into_data().unwrap();
    assert_eq!(result.best_offer().provider_id().as_str(), "MOCK_API_3");
    assert_eq!(result.best_offer().converted_amount(), Decimal::new(5882, 0));

    let amounts: Vec<_> = result.all_offers().iter().map(|o| o.converted_amount()).collect();
    assert_eq!(
        amounts,
        vec![Decimal::new(5550, 0), Decimal::new(5263, 0), Decimal::new(5882, 0)]
    );
}

#[tokio::test]
async fn scenario_connection_fault_is_isolated() {
    let server = MockServer::start().await;
    mount(&server, TOTAL_ROUTE, total_reply(5263)).await;
    mount(&server, NESTED_ROUTE, nested_reply(5882)).await;

    let mut configs = providers(&server);
    configs[0] = ProviderConfig::new("MOCK_API_1", "http://127.0.0.1:1/convert", SchemaKind::Rate)
        .with_timeout(2.0);

    let result = engine(configs)
        .try_best_offer(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.best_offer().provider_id().as_str(), "MOCK_API_3");
    assert_eq!(result.all_offers().len(), 3);

    let failed: Vec<_> = result.all_offers().iter().filter(|o| !o.is_successful()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].provider_id().as_str(), "MOCK_API_1");
    assert!(!failed[0].error_message().unwrap().is_empty());
}

#[tokio::test]
async fn scenario_all_unavailable() {
    let server = MockServer::start().await;
    mount(&server, RATE_ROUTE, unavailable()).await;
    mount(&server, TOTAL_ROUTE, unavailable()).await;
    mount(&server, NESTED_ROUTE, unavailable()).await;

    let engine = engine(providers(&server));
    let envelope = engine.best_offer(&request(), &CancellationToken::new()).await;
    assert!(!envelope.is_successful());
    assert_eq!(envelope.message(), NO_QUOTES);
    assert_eq!(envelope.error_detail(), Some(ALL_FAILED_DETAIL));
    assert!(envelope.data().is_none());

    let error = engine
        .try_best_offer(&request(), &CancellationToken::new())
        .await
        .unwrap_err();
    let AggregationError::AllProvidersFailed { offers } = error else {
        panic!("expected all providers to fail");
    };
    assert!(
        offers
            .iter()
            .all(|o| o.failure_kind() == Some(OfferFailure::HttpStatus))
    );
}

#[tokio::test]
async fn scenario_tie_goes_to_first_configured() {
    let server = MockServer::start().await;
    mount(
        &server,
        RATE_ROUTE,
        rate_reply(55.0).set_delay(Duration::from_millis(150)),
    )
    .await;
    mount(&server, TOTAL_ROUTE, total_reply(5500)).await;
    mount(&server, NESTED_ROUTE, unavailable()).await;

    let result = engine(providers(&server))
        .try_best_offer(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.best_offer().provider_id().as_str(), "MOCK_API_1");
    assert_eq!(result.best_offer().converted_amount(), Decimal::new(5500, 0));
    assert_eq!(result.successful_count(), 2);
}

#[tokio::test]
async fn slow_provider_times_out_without_blocking_others() {
    let server = MockServer::start().await;
    mount(
        &server,
        RATE_ROUTE,
        rate_reply(60.0).set_delay(Duration::from_secs(2)),
    )
    .await;
    mount(&server, TOTAL_ROUTE, total_reply(5263)).await;
    mount(&server, NESTED_ROUTE, nested_reply(5882)).await;

    let mut configs = providers(&server);
    configs[0] = configs[0].clone().with_timeout(0.2);

    let started = Instant::now();
    let result = engine(configs)
        .try_best_offer(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert_eq!(
        result.all_offers()[0].failure_kind(),
        Some(OfferFailure::Timeout)
    );
    assert_eq!(result.best_offer().provider_id().as_str(), "MOCK_API_3");
}

#[tokio::test]
async fn cancellation_stops_in_flight_calls() {
    let server = MockServer::start().await;
    for route in [RATE_ROUTE, TOTAL_ROUTE, NESTED_ROUTE] {
        mount(&server, route, unavailable().set_delay(Duration::from_secs(2))).await;
    }

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let error = engine(providers(&server))
        .try_best_offer(&request(), &cancel)
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_millis(1500));

    let AggregationError::AllProvidersFailed { offers } = error else {
        panic!("expected all providers to fail");
    };
    assert_eq!(offers.len(), 3);
    assert!(
        offers
            .iter()
            .all(|o| o.failure_kind() == Some(OfferFailure::Cancelled))
    );
}

#[tokio::test]
async fn disabled_providers_are_not_called() {
    let server = MockServer::start().await;
    mount(&server, RATE_ROUTE, rate_reply(55.5)).await;
    Mock::given(method("POST"))
        .and(path(TOTAL_ROUTE))
        .respond_with(total_reply(9999))
        .expect(0)
        .mount(&server)
        .await;
    mount(&server, NESTED_ROUTE, nested_reply(5882)).await;

    let mut configs = providers(&server);
    configs[1] = configs[1].clone().with_enabled(false);

    let result = engine(configs)
        .try_best_offer(&request(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.all_offers().len(), 2);
    assert_eq!(result.best_offer().provider_id().as_str(), "MOCK_API_3");
}
