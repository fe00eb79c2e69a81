//! # HTTP Client
//!
//! Thin `reqwest` wrapper used by provider clients.
//!
//! The wrapper sends already-encoded bodies and hands back the raw response
//! so decoding stays with the codec. Non-2xx answers and transport faults are
//! mapped to [`ProviderError`].
//!
//! # Examples
//!
//! ```ignore
//! use exchange_offers::infrastructure::providers::http_client::HttpClient;
//!
//! let client = HttpClient::new(5000)?;
//! let response = client.post_raw(url, body, "application/json").await?;
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

/// A 2xx provider response, body not yet decoded.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Full response body.
    pub body: Bytes,
    /// Time from send to full body receipt.
    pub latency: Duration,
}

/// HTTP client wrapper for provider calls.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if the client cannot be created.
    pub fn new(timeout_ms: u64) -> ProviderResult<Self> {
        Self::with_headers(timeout_ms, HeaderMap::new())
    }

    /// Creates a new HTTP client sending `default_headers` on every request.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InternalError` if the client cannot be created.
    pub fn with_headers(timeout_ms: u64, default_headers: HeaderMap) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                ProviderError::internal_error(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, timeout_ms })
    }

    /// Returns the configured timeout in milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Posts an encoded body and reads the full response.
    ///
    /// Exactly one request is sent.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout` or `ProviderError::Connection` on
    /// transport faults and `ProviderError::HttpStatus` with the raw body for
    /// non-2xx answers.
    pub async fn post_raw(
        &self,
        url: &str,
        body: Bytes,
        content_type: &'static str,
    ) -> ProviderResult<RawResponse> {
        let started = Instant::now();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;
        let latency = started.elapsed();

        if !status.is_success() {
            return Err(self.map_status_error(status, &body));
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body,
            latency,
        })
    }

    fn map_reqwest_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::timeout(format!("Request timed out after {}ms", self.timeout_ms))
        } else if error.is_connect() {
            ProviderError::connection(format!("Connection failed: {}", error))
        } else {
            ProviderError::connection(format!("HTTP request failed: {}", error))
        }
    }

    fn map_status_error(&self, status: StatusCode, body: &[u8]) -> ProviderError {
        let body = String::from_utf8_lossy(body);
        let body = body.trim();
        let body = if body.is_empty() {
            status.canonical_reason().unwrap_or("no body")
        } else {
            body
        };
        ProviderError::http_status(status.as_u16(), body)
    }
}
