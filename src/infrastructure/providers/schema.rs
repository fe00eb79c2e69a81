//! # Provider Schemas
//!
//! Each provider speaks one wire shape. A [`ProviderSchema`] knows how to
//! build that shape's request from an [`ExchangeQuoteRequest`] and where the
//! converted total lives in its response.
//!
//! | Schema | Encoding | Request | Converted total |
//! |--------|----------|---------|-----------------|
//! | [`RateSchema`] | JSON | `{from, to, value}` | `rate × amount` |
//! | [`TotalSchema`] | XML | `<Exchange><From/><To/><Amount/></Exchange>` | `<Result>` |
//! | [`NestedTotalSchema`] | JSON | `{exchange: {sourceCurrency, targetCurrency, quantity}}` | `data.total` |

use crate::domain::entities::ExchangeQuoteRequest;
use crate::domain::value_objects::{ArithmeticError, CheckedArithmetic};
use crate::infrastructure::providers::codec::{ContentEncoding, WireMessage};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies which wire shape a configured provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Provider reports a rate; converted total is `rate × amount`.
    Rate,
    /// Provider reports the converted total directly.
    Total,
    /// Provider reports the converted total under a `data` wrapper.
    NestedTotal,
}

impl SchemaKind {
    /// Returns the schema name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Total => "total",
            Self::NestedTotal => "nested_total",
        }
    }

    /// Returns the encoding this schema's providers use.
    #[must_use]
    pub fn default_encoding(&self) -> ContentEncoding {
        match self {
            Self::Rate | Self::NestedTotal => ContentEncoding::Json,
            Self::Total => ContentEncoding::Xml,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The converted total a provider quoted, plus the rate it reported if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedQuote {
    /// Amount of target currency the provider would deliver.
    pub converted_total: Decimal,
    /// Rate the provider reported independently, used as a consistency check.
    pub reported_rate: Option<Decimal>,
}

/// Why a decoded response did not yield a converted total.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// A required field was absent.
    #[error("missing field '{0}' in provider response")]
    MissingField(&'static str),

    /// A field held something other than a number.
    #[error("field '{field}' is not numeric: '{value}'")]
    NonNumeric {
        /// Field name.
        field: &'static str,
        /// Raw field value.
        value: String,
    },

    /// Provider embedded an error status in a 2xx response.
    #[error("provider reported status {status}: {message}")]
    ProviderStatus {
        /// Embedded status code.
        status: u16,
        /// Embedded message.
        message: String,
    },

    /// Deriving the total overflowed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

/// A provider wire shape.
pub trait ProviderSchema: Send + Sync + fmt::Debug + 'static {
    /// Outbound message type.
    type Request: Serialize + WireMessage + Send + Sync;
    /// Inbound message type.
    type Response: DeserializeOwned + WireMessage + Send + fmt::Debug;

    /// Which schema this is.
    const KIND: SchemaKind;

    /// Builds the provider-specific request.
    fn build_request(request: &ExchangeQuoteRequest) -> Self::Request;

    /// Extracts the converted total for `amount` from a decoded response.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] when the response lacks a usable total.
    fn extract(
        response: &Self::Response,
        amount: Decimal,
    ) -> Result<ExtractedQuote, ExtractionError>;
}

// Rate schema (JSON)

/// JSON request for [`RateSchema`] providers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateRequest {
    from: String,
    to: String,
    #[serde(with = "rust_decimal::serde::float")]
    value: Decimal,
}

impl WireMessage for RateRequest {
    const ROOT_ELEMENT: &'static str = "RateRequest";
}

/// JSON response for [`RateSchema`] providers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateResponse {
    #[serde(default)]
    rate: Option<Decimal>,
}

impl WireMessage for RateResponse {
    const ROOT_ELEMENT: &'static str = "RateResponse";
}

/// Provider that quotes a rate; the converted total is `rate × amount`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RateSchema;

impl ProviderSchema for RateSchema {
    type Request = RateRequest;
    type Response = RateResponse;

    const KIND: SchemaKind = SchemaKind::Rate;

    fn build_request(request: &ExchangeQuoteRequest) -> RateRequest {
        RateRequest {
            from: request.source_currency().to_string(),
            to: request.target_currency().to_string(),
            value: request.amount(),
        }
    }

    fn extract(response: &RateResponse, amount: Decimal) -> Result<ExtractedQuote, ExtractionError> {
        let rate = response.rate.ok_or(ExtractionError::MissingField("rate"))?;
        Ok(ExtractedQuote {
            converted_total: rate.safe_mul(amount)?,
            reported_rate: Some(rate),
        })
    }
}

// Total schema (XML)

/// XML request for [`TotalSchema`] providers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalRequest {
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "To")]
    to: String,
    #[serde(rename = "Amount")]
    amount: String,
}

impl WireMessage for TotalRequest {
    const ROOT_ELEMENT: &'static str = "Exchange";
}

/// XML response for [`TotalSchema`] providers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TotalResponse {
    #[serde(rename = "Result", default)]
    result: Option<String>,
}

impl WireMessage for TotalResponse {
    const ROOT_ELEMENT: &'static str = "ExchangeResult";
}

/// Provider that quotes the converted total directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TotalSchema;

impl ProviderSchema for TotalSchema {
    type Request = TotalRequest;
    type Response = TotalResponse;

    const KIND: SchemaKind = SchemaKind::Total;

    fn build_request(request: &ExchangeQuoteRequest) -> TotalRequest {
        TotalRequest {
            from: request.source_currency().to_string(),
            to: request.target_currency().to_string(),
            amount: request.amount().to_string(),
        }
    }

    fn extract(response: &TotalResponse, _amount: Decimal) -> Result<ExtractedQuote, ExtractionError> {
        let raw = response
            .result
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(ExtractionError::MissingField("Result"))?;
        let converted_total = Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .map_err(|_| ExtractionError::NonNumeric {
                field: "Result",
                value: raw.to_string(),
            })?;
        Ok(ExtractedQuote {
            converted_total,
            reported_rate: None,
        })
    }
}

// Nested total schema (JSON)

/// JSON request for [`NestedTotalSchema`] providers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedTotalRequest {
    exchange: NestedExchange,
}

/// Inner exchange details of a [`NestedTotalRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedExchange {
    source_currency: String,
    target_currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    quantity: Decimal,
}

impl WireMessage for NestedTotalRequest {
    const ROOT_ELEMENT: &'static str = "ExchangeRequest";
}

/// JSON response for [`NestedTotalSchema`] providers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedTotalResponse {
    #[serde(rename = "statuscode", default)]
    status_code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<NestedTotalData>,
}

/// Data wrapper of a [`NestedTotalResponse`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedTotalData {
    #[serde(default)]
    total: Option<Decimal>,
}

impl WireMessage for NestedTotalResponse {
    const ROOT_ELEMENT: &'static str = "ExchangeResponse";
}

/// Provider that quotes the converted total under `data.total`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedTotalSchema;

impl ProviderSchema for NestedTotalSchema {
    type Request = NestedTotalRequest;
    type Response = NestedTotalResponse;

    const KIND: SchemaKind = SchemaKind::NestedTotal;

    fn build_request(request: &ExchangeQuoteRequest) -> NestedTotalRequest {
        NestedTotalRequest {
            exchange: NestedExchange {
                source_currency: request.source_currency().to_string(),
                target_currency: request.target_currency().to_string(),
                quantity: request.amount(),
            },
        }
    }

    fn extract(
        response: &NestedTotalResponse,
        _amount: Decimal,
    ) -> Result<ExtractedQuote, ExtractionError> {
        if let Some(status) = response.status_code.filter(|s| !(200..300).contains(s)) {
            return Err(ExtractionError::ProviderStatus {
                status,
                message: response.message.clone().unwrap_or_default(),
            });
        }
        let data = response
            .data
            .as_ref()
            .ok_or(ExtractionError::MissingField("data"))?;
        let converted_total = data.total.ok_or(ExtractionError::MissingField("data.total"))?;
        Ok(ExtractedQuote {
            converted_total,
            reported_rate: None,
        })
    }
}
