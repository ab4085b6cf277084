#![deny(clippy::future_not_send)]
#![deny(clippy::large_enum_variant)]

//! # whatsapp_cloud_rs
//!
//! A client library for composing and dispatching outbound calls to the WhatsApp Cloud
//! API, and for interpreting its structured success and error responses.
//!
//! Every call goes through the same pipeline:
//!
//! 1. a message builder ([`message::send_text`], [`message::react`], [`message::reply`], ...)
//!    serializes a typed envelope,
//! 2. the [dispatcher](rest::send) assembles a request from [`RequestParams`]
//!    (`{base_url}/{api_version}/{sender_id}/{endpoint}`, headers, bearer auth, query),
//! 3. an injected [`Transport`] (a [`reqwest::Client`] by default) executes it,
//! 4. the outcome is classified by status: 200 into a [`Response`], anything else into
//!    a structured [`Error::Api`] carrying the observed HTTP status.
//!
//! One call is one HTTP exchange. There are no retries, no rate limiting and no
//! internal queues; resilience policy belongs to the caller.
//!
//! ## 🚀 Examples
//!
//! ---
//!
//! ### Create a Client
//! ```rust,no_run
//! use std::time::Duration;
//! use whatsapp_cloud_rs::Client;
//!
//! # fn create_client_example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(15))
//!     .api_version("v19.0")
//!     .build("YOUR_ACCESS_TOKEN")?;
//! # Ok(()) }
//! ```
//!
//! ---
//!
//! ### Send a Simple Text Message
//! ```rust,no_run
//! use whatsapp_cloud_rs::Client;
//!
//! # async fn send_text_example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new("YOUR_ACCESS_TOKEN")?;
//!
//! let response = client
//!     .message("YOUR_BUSINESS_PHONE_NUMBER_ID")
//!     .send_text("+16012345678", "Hello from Rust! How can I help you today?", false)
//!     .await?;
//!
//! println!("Text message sent: {:?}", response.message_id());
//! # Ok(())
//! # }
//! ```
//!
//! ---
//!
//! ### Handle API Errors
//! ```rust,no_run
//! use whatsapp_cloud_rs::{Client, Error};
//!
//! # async fn handle_errors(client: Client) {
//! match client.message("PHONE_ID").react("+16012345678", "wamid.ID", "👍").await {
//!     Ok(response) => println!("reacted: {:?}", response.message_id()),
//!     Err(Error::Api(err)) => eprintln!("rejected with HTTP {}: {err}", err.code),
//!     Err(other) => eprintln!("call failed: {other}"),
//! }
//! # }
//! ```
//!
//! ---
//!
//! ### Bring Your Own Transport
//! ```rust,no_run
//! use whatsapp_cloud_rs::{message::{send_text, SendTextRequest}, RequestParams};
//!
//! # async fn custom_transport() -> Result<(), whatsapp_cloud_rs::Error> {
//! let http = reqwest::Client::builder().build()?;
//! let params = RequestParams::messages("https://graph.facebook.com", "v22.0", "PHONE_ID")
//!     .bearer("YOUR_ACCESS_TOKEN");
//!
//! send_text(&http, &params, &SendTextRequest::new("+16012345678", "hi")).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod message;
pub mod rest;

pub use client::{Client, ClientBuilder, MessageManager};
pub use error::Error;
pub use rest::{send, RequestParams, Response, Transport, TransportResponse};

use serde::{Deserialize, Serialize};
use std::fmt;

/// An error object as reported by the platform inside an error body.
///
/// `code` is the platform's own error code (e.g. `131009`), not an HTTP status; the
/// HTTP status lives on [`ErrorResponse::code`](error::ErrorResponse::code).
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct MetaError {
    #[serde(default)]
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
    #[serde(rename = "href", default, skip_serializing_if = "Option::is_none")]
    pub support: Option<String>,
    #[serde(
        rename = "error_data",
        default,
        skip_serializing_if = "MetaErrorMetadata::is_none"
    )]
    pub error_metadata: MetaErrorMetadata,
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {})", self.code)?;

        if let Some(subcode) = self.error_subcode {
            write!(f, " (subcode: {})", subcode)?;
        }

        if let Some(title) = &self.title {
            write!(f, " - {}", title)?;
        }

        if let Some(r#type) = &self.r#type {
            write!(f, " (type: {})", r#type)?;
        }

        if let Some(message) = &self.message {
            write!(f, ": {}", message)?;
        }

        if let Some(details) = &self.error_metadata.details {
            write!(f, "\n  Details: {}", details)?;
        }

        if let Some(support) = &self.support {
            write!(f, "\n  More info: {}", support)?;
        }

        if let Some(id) = &self.fbtrace_id {
            write!(f, "\n  Trace ID: {}", id)?;
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct MetaErrorMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl MetaErrorMetadata {
    fn is_none(&self) -> bool {
        self.details.is_none() && self.messaging_product.is_none()
    }
}
