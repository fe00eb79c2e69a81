//! # Transport Codec
//!
//! Serializes outbound provider messages and deserializes inbound ones for
//! the two supported content encodings.
//!
//! - JSON: outbound field names as declared by the message type; inbound
//!   object keys are folded to ASCII lower case before deserializing, so
//!   inbound types declare their field names in lower case.
//! - XML: the root element is fixed per message type
//!   ([`WireMessage::ROOT_ELEMENT`]) and is checked on decode.
//!
//! # Examples
//!
//! ```
//! use exchange_offers::infrastructure::providers::codec::{ContentEncoding, WireMessage};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct RateReply {
//!     rate: f64,
//! }
//!
//! impl WireMessage for RateReply {
//!     const ROOT_ELEMENT: &'static str = "RateReply";
//! }
//!
//! let reply: RateReply = ContentEncoding::Json.decode(br#"{"Rate": 55.5}"#).unwrap();
//! assert_eq!(reply.rate, 55.5);
//! ```

use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// A message exchanged with a provider.
pub trait WireMessage {
    /// Root element name used by the XML encoding.
    const ROOT_ELEMENT: &'static str;
}

/// Wire serialization format used by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    /// Structured text (`application/json`).
    #[default]
    Json,
    /// Markup with named elements (`application/xml`).
    Xml,
}

impl ContentEncoding {
    /// Returns the encoding name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }

    /// Returns the MIME type used for `Content-Type` and `Accept`.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }

    /// Encodes a message into its wire representation.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Encode` if the message cannot be serialized.
    pub fn encode<T>(&self, message: &T) -> CodecResult<Bytes>
    where
        T: Serialize + WireMessage,
    {
        match self {
            Self::Json => serde_json::to_vec(message)
                .map(Bytes::from)
                .map_err(|e| CodecError::encode(*self, e)),
            Self::Xml => {
                let body = quick_xml::se::to_string_with_root(T::ROOT_ELEMENT, message)
                    .map_err(|e| CodecError::encode(*self, e))?;
                Ok(Bytes::from(format!("{XML_DECLARATION}{body}")))
            }
        }
    }

    /// Decodes a wire representation into a message.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Empty` for a blank body,
    /// `CodecError::UnexpectedRoot` when an XML document has the wrong root
    /// element, and `CodecError::Decode` for any other parse failure.
    pub fn decode<T>(&self, bytes: &[u8]) -> CodecResult<T>
    where
        T: DeserializeOwned + WireMessage,
    {
        let text = std::str::from_utf8(bytes).map_err(|e| CodecError::decode(*self, e))?;
        let text = text.trim_start_matches('\u{feff}').trim();
        if text.is_empty() {
            return Err(CodecError::Empty);
        }

        match self {
            Self::Json => {
                let value: Value =
                    serde_json::from_str(text).map_err(|e| CodecError::decode(*self, e))?;
                serde_json::from_value(fold_keys(value)).map_err(|e| CodecError::decode(*self, e))
            }
            Self::Xml => {
                check_root(text, T::ROOT_ELEMENT)?;
                quick_xml::de::from_str(text).map_err(|e| CodecError::decode(*self, e))
            }
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "application/json" => Ok(Self::Json),
            "xml" | "application/xml" => Ok(Self::Xml),
            other => Err(CodecError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Lower-cases every object key, recursively.
fn fold_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key.to_ascii_lowercase(), fold_keys(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(fold_keys).collect()),
        other => other,
    }
}

fn check_root(text: &str, expected: &'static str) -> CodecResult<()> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                if element.local_name().as_ref() == expected.as_bytes() {
                    return Ok(());
                }
                return Err(CodecError::UnexpectedRoot {
                    expected,
                    found: String::from_utf8_lossy(element.name().as_ref()).into_owned(),
                });
            }
            Ok(Event::Eof) => return Err(CodecError::Empty),
            Ok(_) => {}
            Err(e) => return Err(CodecError::decode(ContentEncoding::Xml, e)),
        }
    }
}

/// Error type for encoding and decoding provider messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Serialization failed.
    #[error("{encoding} encode error: {message}")]
    Encode {
        /// Encoding in use.
        encoding: ContentEncoding,
        /// Error message.
        message: String,
    },

    /// Deserialization failed.
    #[error("{encoding} decode error: {message}")]
    Decode {
        /// Encoding in use.
        encoding: ContentEncoding,
        /// Error message.
        message: String,
    },

    /// XML document root does not match the expected message type.
    #[error("unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot {
        /// Expected root element.
        expected: &'static str,
        /// Root element found.
        found: String,
    },

    /// Body was empty.
    #[error("empty payload")]
    Empty,

    /// Encoding name is not recognized.
    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),
}

impl CodecError {
    fn encode(encoding: ContentEncoding, error: impl fmt::Display) -> Self {
        Self::Encode {
            encoding,
            message: error.to_string(),
        }
    }

    fn decode(encoding: ContentEncoding, error: impl fmt::Display) -> Self {
        Self::Decode {
            encoding,
            message: error.to_string(),
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
