//! WhatsApp Cloud API client
//!
//! This module provides a configured client for repeated calls against the Cloud API.
//! It holds the HTTP connection pool, the API location and the access token, and fills
//! [`RequestParams`] from them so each call only names what differs.
//!
//! The free functions in [`message`](crate::message) remain available for callers who
//! bring their own [`Transport`](crate::Transport) or assemble parameters themselves.
//!
//! # Example – Creating a Client
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use whatsapp_cloud_rs::client::Client;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(15))
//!     .api_version("v19.0")
//!     .build("YOUR_ACCESS_TOKEN")?;
//! # Ok(()) }
//! ```
//!
//! # Example – Sending a Message
//!
//! ```rust,no_run
//! use whatsapp_cloud_rs::{client::Client, message::Location};
//!
//! # async fn run(client: Client) -> Result<(), Box<dyn std::error::Error>> {
//! let location = Location::new(37.4421, -122.1615).name("Philz Coffee");
//!
//! client
//!     .message("1234567890")
//!     .send_location("9876543210", location)
//!     .await?;
//! # Ok(()) }
//! ```

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use reqwest::{
    header::CONTENT_TYPE, Client as HttpClient, ClientBuilder as HttpClientBuilder, Method,
};
use serde::Serialize;

use crate::{
    error::Error,
    message::{
        self, Contact, Location, MessageType, ReactRequest, ReplyRequest, SendContactRequest,
        SendLocationRequest, SendTextRequest,
    },
    rest::{RequestParams, Response},
};

/// Default Graph API host
const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";
/// Default API version for the WhatsApp Cloud API
const DEFAULT_API_VERSION: &str = "v22.0";
/// Default user agent for the client
const USER_AGENT: &str = concat!("whatsapp-cloud-rs/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// The primary entry point for repeated calls to the **WhatsApp Cloud API**.
///
/// Cloning a `Client` is cheap; clones share one connection pool and may be used
/// from many tasks at once.
///
/// # Example
/// ```rust,no_run
/// use whatsapp_cloud_rs::Client;
///
/// # async fn example() {
/// let client = Client::new("YOUR_WHATSAPP_ACCESS_TOKEN").unwrap();
/// client
///     .message("phone_number_id")
///     .send_text("recipient_number", "Hello from Rust!", false)
///     .await
///     .unwrap();
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<InnerClient>,
}

#[derive(Debug)]
struct InnerClient {
    http_client: HttpClient,
    base_url: String,
    api_version: String,
    headers: BTreeMap<String, String>,
    token: Option<String>,
}

impl Client {
    /// Creates a new client with default configuration.
    ///
    /// # Arguments
    /// * `token` - The access token used to authenticate with the WhatsApp API
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::builder().build(token)
    }

    /// Starts building a new client with custom settings.
    ///
    /// # Example
    /// ```rust,no_run
    /// use std::time::Duration;
    /// use whatsapp_cloud_rs::Client;
    ///
    /// let client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .api_version("19.0")
    ///     .build("your_token")
    ///     .unwrap();
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a message manager for sending messages as a given sender.
    ///
    /// # Arguments
    /// * `sender_id` - The phone number id messages are sent from
    pub fn message(&self, sender_id: impl Into<String>) -> MessageManager {
        MessageManager {
            client: self.clone(),
            sender_id: sender_id.into(),
        }
    }

    /// Returns parameters for `endpoint` under `sender_id`, pre-filled with this
    /// client's location, headers and token.
    ///
    /// The method defaults to `GET`.
    pub fn params(
        &self,
        sender_id: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> RequestParams {
        let inner = &self.inner;
        let mut params = RequestParams::new(
            inner.base_url.as_str(),
            inner.api_version.as_str(),
            sender_id,
            endpoint,
        );
        params.headers.extend(inner.headers.clone());
        params.bearer = inner.token.clone();
        params
    }

    /// The underlying HTTP client, usable as a [`Transport`](crate::Transport).
    #[inline]
    pub fn transport(&self) -> &HttpClient {
        &self.inner.http_client
    }

    /// Sends `payload` to the endpoint described by `params` through this client's
    /// connection pool.
    pub async fn send(
        &self,
        params: &RequestParams,
        payload: Option<Vec<u8>>,
    ) -> Result<Response, Error> {
        crate::rest::send(self.transport(), params, payload).await
    }
}

/// Builder for configuring a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    http: HttpClientBuilder,
    base_url: String,
    api_version: String,
    headers: BTreeMap<String, String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            http: HttpClientBuilder::new().user_agent(USER_AGENT),
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            headers: BTreeMap::new(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout for all calls made by the client.
    ///
    /// A call that takes longer fails with [`Error::Network`].
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.http = self.http.timeout(duration);
        self
    }

    /// Sets the API version to use (e.g. `"v19.0"`).
    ///
    /// If you leave out the `"v"` prefix, it will be added.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.api_version = if version.starts_with('v') {
            version
        } else {
            format!("v{version}")
        };
        self
    }

    /// Points the client somewhere other than `https://graph.facebook.com`,
    /// e.g. a proxy or a mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the `User-Agent` sent with every call.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http = self.http.user_agent(user_agent.into());
        self
    }

    /// Adds a header sent with every call. Bearer auth still takes precedence over
    /// an `Authorization` header set here.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Finishes building the client with the given access token.
    ///
    /// An empty token builds a client that sends no `Authorization` header.
    pub fn build(self, token: impl Into<String>) -> Result<Client, Error> {
        let token = token.into();
        let http_client = self.http.build()?;

        Ok(Client {
            inner: Arc::new(InnerClient {
                http_client,
                base_url: self.base_url,
                api_version: self.api_version,
                headers: self.headers,
                token: (!token.is_empty()).then_some(token),
            }),
        })
    }
}

/// Manager for sending messages from one business phone number.
///
/// A `MessageManager` is obtained via [`Client::message()`]. Every method makes
/// exactly one `POST` to `{sender_id}/messages`.
///
/// # Example
/// ```rust,no_run
/// use whatsapp_cloud_rs::{client::Client, message::MessageType};
///
/// # async fn example(client: &Client) -> Result<(), whatsapp_cloud_rs::Error> {
/// let manager = client.message("1234567890");
///
/// let sent = manager.send_text("9876543210", "Your order shipped!", false).await?;
/// let id = sent.message_id().unwrap_or_default();
///
/// manager.react("9876543210", id, "📦").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct MessageManager {
    client: Client,
    sender_id: String,
}

impl MessageManager {
    /// The parameters every call of this manager is sent with.
    pub fn params(&self) -> RequestParams {
        self.client
            .params(self.sender_id.as_str(), "messages")
            .method(Method::POST)
            .header(CONTENT_TYPE.as_str(), "application/json")
    }

    pub fn sender_id(&self) -> &str {
        &self.sender_id
    }

    /// Sends a text message.
    pub async fn send_text(
        &self,
        to: impl Into<String>,
        body: impl Into<String>,
        preview_url: bool,
    ) -> Result<Response, Error> {
        let request = SendTextRequest::new(to, body).preview_url(preview_url);
        message::send_text(self.client.transport(), &self.params(), &request).await
    }

    /// Sends a location pin.
    pub async fn send_location(
        &self,
        to: impl Into<String>,
        location: Location,
    ) -> Result<Response, Error> {
        let request = SendLocationRequest {
            recipient: to.into(),
            location,
        };
        message::send_location(self.client.transport(), &self.params(), &request).await
    }

    /// Reacts to `message_id` with `emoji`.
    pub async fn react(
        &self,
        to: impl Into<String>,
        message_id: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Result<Response, Error> {
        let request = ReactRequest {
            recipient: to.into(),
            message_id: message_id.into(),
            emoji: emoji.into(),
        };
        message::react(self.client.transport(), &self.params(), &request).await
    }

    /// Sends contact cards.
    pub async fn send_contact(
        &self,
        to: impl Into<String>,
        contacts: Vec<Contact>,
    ) -> Result<Response, Error> {
        let request = SendContactRequest {
            recipient: to.into(),
            contacts,
        };
        message::send_contact(self.client.transport(), &self.params(), &request).await
    }

    /// Sends `content` as a reply to `context`, keyed by `message_type`.
    pub async fn reply<C: Serialize + Send + Sync>(
        &self,
        to: impl Into<String>,
        context: impl Into<String>,
        message_type: MessageType,
        content: C,
    ) -> Result<Response, Error> {
        let request = ReplyRequest::new(to, context, message_type, content);
        message::reply(self.client.transport(), &self.params(), &request).await
    }

    /// Marks an incoming message as read.
    pub async fn mark_read(&self, message_id: &str) -> Result<Response, Error> {
        message::mark_read(self.client.transport(), &self.params(), message_id).await
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn params_carry_client_defaults() {
        let client = Client::builder()
            .api_version("23.0")
            .base_url("http://127.0.0.1:9999")
            .header("X-Request-Source", "tests")
            .build("EAAD...")
            .unwrap();

        let params = client.message("phone_id_222").params();

        assert_eq!(params.base_url, "http://127.0.0.1:9999");
        assert_eq!(params.api_version, "v23.0");
        assert_eq!(params.sender_id, "phone_id_222");
        assert_eq!(params.endpoint, "messages");
        assert_eq!(params.method, Method::POST);
        assert_eq!(params.bearer.as_deref(), Some("EAAD..."));
        assert_eq!(params.headers["X-Request-Source"], "tests");
        assert_eq!(params.headers["content-type"], "application/json");
    }

    #[test]
    fn api_version_prefix_is_not_doubled() {
        let client = Client::builder().api_version("v19.0").build("t").unwrap();
        assert_eq!(client.params("1", "messages").api_version, "v19.0");
    }

    #[test]
    fn empty_token_sends_no_auth() {
        let client = Client::builder().build("").unwrap();

        let params = client.params("1", "messages");

        assert_eq!(params.bearer, None);
        assert_eq!(params.method, Method::GET);
        assert_eq!(params.base_url, DEFAULT_BASE_URL);
        assert_eq!(params.api_version, DEFAULT_API_VERSION);
    }
}
