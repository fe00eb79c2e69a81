//! # Provider Client
//!
//! One [`HttpProviderClient`] wraps one remote endpoint. A call builds the
//! provider-specific request, sends it exactly once, and returns a
//! [`ProviderOutcome`]; it never propagates a fault.
//!
//! The aggregator sees every client through the object-safe
//! [`QuoteProvider`] trait, which also runs the normalizer so each call
//! yields exactly one [`ProviderOffer`].

use crate::domain::entities::{ExchangeQuoteRequest, ProviderOffer};
use crate::domain::value_objects::ProviderId;
use crate::infrastructure::observability::QuoteObserver;
use crate::infrastructure::providers::codec::{CodecError, ContentEncoding};
use crate::infrastructure::providers::config::ProviderConfig;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::normalizer::normalize;
use crate::infrastructure::providers::schema::ProviderSchema;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// `User-Agent` sent with every provider request.
pub const CLIENT_USER_AGENT: &str = "ExchangeRateOffers/1.0";

/// Body of a 2xx response.
#[derive(Debug, Clone)]
pub enum Payload<R> {
    /// The body decoded into the provider's response type.
    Decoded(R),
    /// Transport succeeded but the body was unusable.
    Undecodable(CodecError),
}

/// Result of one request/response cycle.
#[derive(Debug, Clone)]
pub enum ProviderOutcome<R> {
    /// Provider answered 2xx.
    Success {
        /// Response body.
        payload: Payload<R>,
        /// HTTP status code.
        status: u16,
        /// Time from send to full body receipt.
        latency: Duration,
    },
    /// No 2xx answer.
    Failure {
        /// What went wrong.
        error: ProviderError,
        /// Time spent before the failure, if a request was sent.
        latency: Option<Duration>,
    },
}

impl<R> ProviderOutcome<R> {
    /// Returns true if the provider answered 2xx.
    #[inline]
    #[must_use]
    pub fn is_transport_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the HTTP status, if the provider answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. } => Some(*status),
            Self::Failure { error, .. } => error.status_code(),
        }
    }
}

/// A provider the aggregator can ask for an offer.
#[async_trait]
pub trait QuoteProvider: Send + Sync + fmt::Debug {
    /// Returns the provider identifier.
    fn provider_id(&self) -> &ProviderId;

    /// Returns the deadline for one call.
    fn timeout(&self) -> Duration;

    /// Calls the provider and normalizes the outcome.
    ///
    /// Always yields an offer; failures become failed offers.
    async fn fetch_offer(&self, request: &ExchangeQuoteRequest) -> ProviderOffer;
}

/// HTTP client for one provider speaking schema `S`.
#[derive(Debug)]
pub struct HttpProviderClient<S: ProviderSchema> {
    config: ProviderConfig,
    encoding: ContentEncoding,
    http: HttpClient,
    observer: Arc<dyn QuoteObserver>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: ProviderSchema> HttpProviderClient<S> {
    /// Creates a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidConfig` if the configuration is invalid
    /// and `ProviderError::InternalError` if the HTTP client cannot be built.
    pub fn new(config: ProviderConfig, observer: Arc<dyn QuoteObserver>) -> ProviderResult<Self> {
        config.validate()?;
        if config.schema != S::KIND {
            return Err(ProviderError::invalid_config(format!(
                "{}: configured schema '{}' does not match client schema '{}'",
                config.provider_id,
                config.schema,
                S::KIND
            )));
        }

        let encoding = config.content_encoding();
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(encoding.mime_type()));

        let timeout_ms = u64::try_from(config.timeout().as_millis()).unwrap_or(u64::MAX);
        let http = HttpClient::with_headers(timeout_ms, headers)?;

        Ok(Self {
            config,
            encoding,
            http,
            observer,
            _schema: PhantomData,
        })
    }

    /// Returns the provider configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Performs one request/response cycle.
    pub async fn call(&self, request: &ExchangeQuoteRequest) -> ProviderOutcome<S::Response> {
        let outbound = S::build_request(request);
        let body = match self.encoding.encode(&outbound) {
            Ok(body) => body,
            Err(e) => {
                return ProviderOutcome::Failure {
                    error: ProviderError::Encode(e),
                    latency: None,
                };
            }
        };

        self.observer
            .request_sent(&self.config.provider_id, self.encoding);
        let started = Instant::now();

        match self
            .http
            .post_raw(&self.config.base_url, body, self.encoding.mime_type())
            .await
        {
            Ok(raw) => {
                let payload = match self.encoding.decode::<S::Response>(&raw.body) {
                    Ok(response) => Payload::Decoded(response),
                    Err(e) => Payload::Undecodable(e),
                };
                ProviderOutcome::Success {
                    payload,
                    status: raw.status,
                    latency: raw.latency,
                }
            }
            Err(error) => ProviderOutcome::Failure {
                error,
                latency: Some(started.elapsed()),
            },
        }
    }
}

#[async_trait]
impl<S: ProviderSchema> QuoteProvider for HttpProviderClient<S> {
    fn provider_id(&self) -> &ProviderId {
        &self.config.provider_id
    }

    fn timeout(&self) -> Duration {
        self.config.timeout()
    }

    async fn fetch_offer(&self, request: &ExchangeQuoteRequest) -> ProviderOffer {
        let outcome = self.call(request).await;
        normalize::<S>(self.config.provider_id.clone(), request.amount(), outcome)
    }
}
