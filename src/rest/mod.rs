//! This module provides the request/response pipeline shared by every call in the crate.
//!
//! A call is described by [`RequestParams`], turned into a [`reqwest::Request`] by the
//! request builder, executed through an injected [`Transport`], and classified by status
//! into a [`Response`] or an [`Error`]. Nothing here holds state between calls, so any
//! number of calls may run concurrently as long as the transport allows it.

use std::{collections::BTreeMap, future::Future, sync::Arc, time::Duration};

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, CONTENT_TYPE},
    Method, Request, StatusCode,
};
use tracing::debug;

use crate::error::Error;

pub(crate) mod client;
pub(crate) mod request;

pub use client::{MessageId, Response, ResponseContact, ResponseMessage};

// --- Endpoint Parameters ---

/// Everything needed to address one API call.
///
/// The URL is `{base_url}/{api_version}/{sender_id}/{endpoint}`, joined with path
/// semantics so stray slashes in any part are normalized. `headers` are applied first,
/// then `bearer` (when set) overwrites any `Authorization` header. `query` is encoded
/// into the URL's query string, one value per key.
///
/// # Example
/// ```rust
/// use whatsapp_cloud_rs::RequestParams;
///
/// let params = RequestParams::messages("https://graph.facebook.com", "v22.0", "1234567890")
///     .bearer("EAAG...")
///     .query("fields", "id");
///
/// assert_eq!(params.endpoint, "messages");
/// ```
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct RequestParams {
    pub base_url: String,
    pub api_version: String,
    /// The platform-assigned id of the sending phone number.
    pub sender_id: String,
    pub endpoint: String,
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub bearer: Option<String>,
    /// Deadline for the transport execution step.
    pub timeout: Option<Duration>,
}

impl RequestParams {
    /// Creates parameters for a `GET` call with no headers, query or auth.
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        sender_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_version: api_version.into(),
            sender_id: sender_id.into(),
            endpoint: endpoint.into(),
            method: Method::GET,
            headers: BTreeMap::new(),
            query: BTreeMap::new(),
            bearer: None,
            timeout: None,
        }
    }

    /// Creates parameters for posting a JSON message to the sender's `messages` endpoint.
    pub fn messages(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        sender_id: impl Into<String>,
    ) -> Self {
        Self::new(base_url, api_version, sender_id, "messages")
            .method(Method::POST)
            .header(CONTENT_TYPE.as_str(), "application/json")
    }

    #[inline]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets a header. A later value for the same name replaces the earlier one.
    #[inline]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets a query parameter. A later value for the same key replaces the earlier one.
    #[inline]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    #[inline]
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    #[inline]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

// --- Transport Seam ---

/// Executes a fully built request and hands back the raw response.
///
/// Implemented for [`reqwest::Client`]. Any transport-level failure (connection,
/// TLS, timeout) should be returned as [`Error::Network`]; the dispatcher passes it
/// through without classifying it further.
pub trait Transport: Sync {
    /// The raw response produced by this transport.
    type Response: TransportResponse;

    /// Sends `request` and waits for the response head.
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Self::Response, Error>> + Send;
}

/// A raw response as handed back by a [`Transport`].
pub trait TransportResponse: Send {
    fn status(&self) -> StatusCode;

    fn headers(&self) -> &HeaderMap;

    /// Reads the whole body, consuming the response.
    ///
    /// `Ok(None)` means the response had no body stream at all; a present but
    /// zero-length body is `Ok(Some(Bytes::new()))`.
    fn body(self) -> impl Future<Output = Result<Option<Bytes>, Error>> + Send;
}

impl Transport for reqwest::Client {
    type Response = reqwest::Response;

    #[inline]
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Self::Response, Error>> + Send {
        let fut = reqwest::Client::execute(self, request);
        async move { fut.await.map_err(Error::network) }
    }
}

impl TransportResponse for reqwest::Response {
    #[inline]
    fn status(&self) -> StatusCode {
        reqwest::Response::status(self)
    }

    #[inline]
    fn headers(&self) -> &HeaderMap {
        reqwest::Response::headers(self)
    }

    #[inline]
    fn body(self) -> impl Future<Output = Result<Option<Bytes>, Error>> + Send {
        async move { self.bytes().await.map(Some).map_err(Error::network) }
    }
}

impl<T: Transport> Transport for &T {
    type Response = T::Response;

    #[inline]
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Self::Response, Error>> + Send {
        (**self).execute(request)
    }
}

impl<T: Transport + Send> Transport for Arc<T> {
    type Response = T::Response;

    #[inline]
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Self::Response, Error>> + Send {
        (**self).execute(request)
    }
}

// --- Dispatcher ---

/// Builds the request described by `params`, executes it through `transport` and
/// decodes the outcome.
///
/// - `payload` becomes the request body verbatim; `None` sends no body.
/// - Status 200 decodes into a [`Response`].
/// - Any other status decodes into an [`ErrorResponse`] whose `code` is the observed
///   status, returned as [`Error::Api`].
///
/// Construction, transport, empty-body and decode failures are returned as their
/// own [`Error`] variants. Exactly one request is made; nothing is retried. Dropping
/// the returned future cancels the call.
///
/// # Example
/// ```rust,no_run
/// use whatsapp_cloud_rs::{rest::send, RequestParams};
///
/// # async fn example() -> Result<(), whatsapp_cloud_rs::Error> {
/// let http = reqwest::Client::new();
/// let params = RequestParams::messages("https://graph.facebook.com", "v22.0", "1234567890")
///     .bearer("EAAG...");
/// let body = br#"{"messaging_product":"whatsapp","to":"16505551234","type":"text","text":{"body":"hi"}}"#;
///
/// let response = send(&http, &params, Some(body.to_vec())).await?;
/// println!("sent {:?}", response.message_id());
/// # Ok(()) }
/// ```
///
/// [`ErrorResponse`]: crate::error::ErrorResponse
pub async fn send<T: Transport>(
    transport: &T,
    params: &RequestParams,
    payload: Option<Vec<u8>>,
) -> Result<Response, Error> {
    let request = request::build_request(params, payload)?;
    debug!(method = %request.method(), path = request.url().path(), "dispatching request");

    let exchange = async move {
        let response = transport.execute(request).await?;
        client::handle_response(response).await
    };

    // The deadline covers reading the body, not just the response head.
    match params.timeout {
        Some(deadline) => tokio::time::timeout(deadline, exchange)
            .await
            .map_err(Error::network)?,
        None => exchange.await,
    }
}
