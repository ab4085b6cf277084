use reqwest::{header::HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use super::TransportResponse;
use crate::{
    error::{Error, ErrorResponse, Expected, ParseError},
    message::MessageStatus,
};

/// A successful (HTTP 200) API response.
///
/// # Example
/// ```rust,no_run
/// # async fn example(response: whatsapp_cloud_rs::Response) {
/// if let Some(id) = response.message_id() {
///     println!("queued as {id} ({})", response.status);
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub message: ResponseMessage,
}

impl Response {
    /// The id of the first message the API accepted, a `wamid.`-prefixed string.
    #[inline]
    pub fn message_id(&self) -> Option<&str> {
        self.message.messages.first().map(|message| message.id.as_str())
    }
}

/// The decoded body of a successful call.
///
/// Message sends answer with `messages` and `contacts`; other calls such as read
/// receipts only answer `{"success": true}`, so every field is optional here.
#[derive(Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ResponseMessage {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub contacts: Vec<ResponseContact>,
    #[serde(default)]
    pub messages: Vec<MessageId>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// The recipient echoed back by the API.
#[derive(Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct ResponseContact {
    /// What was put in `to`.
    #[serde(default)]
    pub input: String,
    /// The WhatsApp id it resolved to.
    #[serde(default)]
    pub wa_id: String,
}

/// A message accepted by the API.
#[derive(Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct MessageId {
    pub id: String,
    #[serde(default)]
    pub message_status: Option<MessageStatus>,
}

/// Reads the body of `response` fully and classifies it by status.
pub(crate) async fn handle_response<R: TransportResponse>(response: R) -> Result<Response, Error> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.body().await?.ok_or(Error::EmptyBody)?;

    debug!(status = status.as_u16(), len = body.len(), "response received");
    classify(status, headers, &body)
}

fn classify(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Result<Response, Error> {
    if status != StatusCode::OK {
        return Err(handle_not_ok(status, body));
    }

    match serde_json::from_slice(body) {
        Ok(message) => Ok(Response {
            status,
            headers,
            message,
        }),
        Err(err) => Err(ParseError::new(status, Expected::Success, body, err).into()),
    }
}

#[inline]
fn handle_not_ok(status: StatusCode, body: &[u8]) -> Error {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(mut structured_error) => {
            // The transport's status is authoritative over anything the body claims.
            structured_error.code = status.as_u16();
            structured_error.into()
        }
        Err(err) => {
            warn!(status = status.as_u16(), error = %err, "undecodable error body");
            ParseError::new(status, Expected::Error, body, err).into()
        }
    }
}
