//! Error Handling
//!
//! This module defines the crate's error types. Every call made through this crate
//! maps to exactly one outbound HTTP exchange, and every way that exchange can go wrong
//! is a distinct [`Error`] variant so callers can `match` instead of downcasting.
//!
//! | Variant | Failed step |
//! |---|---|
//! | [`Error::Request`] | URL, header or method construction |
//! | [`Error::Network`] | transport execution (network, timeout, cancellation) or body read |
//! | [`Error::EmptyBody`] | response arrived without a body stream |
//! | [`Error::Parse`] | body present but not decodable into the expected shape |
//! | [`Error::Api`] | non-200 status with a decoded [`ErrorResponse`] |
//! | [`Error::Serialize`] | outgoing envelope could not be serialized |
//! | [`Error::InvalidArgument`] | caller input rejected before any work |
//!
//! Only [`Error::Api`] is a business-level failure meant for programmatic inspection;
//! the rest describe plumbing problems and are returned unchanged.

use std::error::Error as StdError;
use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::MetaError;

/// The **top-level error enum** for the `whatsapp-cloud-rs` crate.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request could not be built from its [`RequestParams`]: a malformed base URL,
    /// an empty path segment, an invalid header name or value.
    ///
    /// These are never retried; fix the parameters.
    ///
    /// [`RequestParams`]: crate::RequestParams
    #[error("Failed to build request: {0}")]
    Request(#[source] BoxError),

    /// The transport failed to execute the request or to read the response body.
    ///
    /// This covers connection errors, TLS errors, timeouts and cancellation. The
    /// underlying error is kept as the source, unclassified.
    #[error("A network error occurred: {0}")]
    Network(#[source] BoxError),

    /// The response carried no body stream at all.
    ///
    /// This is distinct from a present but zero-length body, which fails to decode
    /// and surfaces as [`Error::Parse`].
    #[error("empty response body")]
    EmptyBody,

    /// The response body could not be decoded into the expected structure.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The API answered with a non-200 status and a well-formed error body.
    ///
    /// [`ErrorResponse::code`] always holds the HTTP status actually observed.
    #[error("The API returned an error: {0}")]
    Api(Box<ErrorResponse>),

    /// The outgoing message envelope could not be serialized.
    #[error("Failed to serialize request payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Caller input was rejected before any request construction took place.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    pub(crate) fn request(err: impl Into<BoxError>) -> Self {
        Self::Request(err.into())
    }

    pub(crate) fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }

    /// Returns the HTTP status code attached to this error, if the exchange got
    /// far enough to observe one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api(err) => StatusCode::from_u16(err.code).ok(),
            Self::Parse(err) => Some(err.status),
            _ => None,
        }
    }

    /// Borrows the structured API error, if this is one.
    pub fn api_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this error is a structured API error rather than a plumbing failure.
    #[inline]
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

impl From<ErrorResponse> for Error {
    #[inline]
    fn from(value: ErrorResponse) -> Self {
        Self::Api(Box::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_builder() {
            Self::request(value)
        } else {
            Self::network(value)
        }
    }
}

/// Which body shape the decoder expected when it failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Expected {
    /// The success message structure of a 200 response.
    Success,
    /// The error structure of a non-200 response.
    Error,
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Represents an error that occurred while **decoding a response body**.
///
/// # Fields
/// - `status`: The HTTP status the body arrived with.
/// - `expected`: Whether the success or the error shape was being decoded.
/// - `body`: The original raw body, lossily converted to UTF-8, useful for debugging.
#[derive(thiserror::Error, Debug)]
#[error(
    "Failed to decode {expected} response body (HTTP status {status}). Raw body content was: '{body}'."
)]
#[non_exhaustive]
pub struct ParseError {
    pub status: StatusCode,
    pub expected: Expected,
    pub body: String,
    #[source]
    pub(crate) source: serde_json::Error,
}

impl ParseError {
    pub(crate) fn new(
        status: StatusCode,
        expected: Expected,
        body: &[u8],
        source: serde_json::Error,
    ) -> Self {
        Self {
            status,
            expected,
            body: String::from_utf8_lossy(body).into_owned(),
            source,
        }
    }
}

/// A structured error decoded from a non-200 response body.
///
/// The API reports failures as `{"error": {...}}`. Some gateways additionally put a
/// top-level `code` in the body; whatever it says, [`ErrorResponse::code`] is
/// overwritten with the HTTP status the transport observed, so it is always
/// authoritative.
///
/// # Example
/// ```rust
/// use whatsapp_cloud_rs::error::ErrorResponse;
///
/// let body = r#"{"error":{"code":131009,"message":"Parameter value is not valid"}}"#;
/// let mut err: ErrorResponse = serde_json::from_str(body).unwrap();
/// err.code = 400;
///
/// assert_eq!(err.code, 400);
/// assert_eq!(err.error.unwrap().code, 131009);
/// ```
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ErrorResponse {
    /// The HTTP status code of the response.
    ///
    /// Never read from the body; whatever `code` the body carries is ignored.
    #[serde(default, skip_deserializing)]
    pub code: u16,
    /// The platform's own error object, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MetaError>,
}

impl ErrorResponse {
    /// Returns the HTTP status as a [`StatusCode`].
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.code).ok()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP status {}", self.code)?;

        if let Some(error) = &self.error {
            write!(f, " {error}")?;
        }

        Ok(())
    }
}

impl StdError for ErrorResponse {}

/// A convenient type alias for a boxed, trait-object error that can be sent across threads.
pub type BoxError = Box<dyn StdError + Send + Sync>;
