//! WhatsApp Message Envelopes and Builders
//!
//! This module defines the outbound message payloads, the [`Envelope`] they travel in,
//! and one builder function per message kind that serializes an envelope and hands it
//! to the [dispatcher](crate::rest::send).
//!
//! ## Key Types & Functions
//!
//! - [`Envelope`]: the top-level request body. Its [`Content`] is a tagged enum, so the
//!   `type` discriminant and the populated payload field can never disagree.
//! - [`send_text`], [`send_location`], [`react`], [`send_contact`]: one builder per kind.
//! - [`reply`]: sends any payload as a reply to an earlier message, keyed by its
//!   [`MessageType`].
//! - [`mark_read`]: marks an incoming message as read.
//!
//! ## Examples
//!
//! ---
//! ### Send a Simple Text Message
//! ```rust,no_run
//! use whatsapp_cloud_rs::{message::{send_text, SendTextRequest}, RequestParams};
//!
//! # async fn example() -> Result<(), whatsapp_cloud_rs::Error> {
//! let http = reqwest::Client::new();
//! let params = RequestParams::messages("https://graph.facebook.com", "v22.0", "BUSINESS_NO_ID")
//!     .bearer("YOUR_ACCESS_TOKEN");
//!
//! let request = SendTextRequest::new("+16012345678", "Hello from Rust!");
//! let response = send_text(&http, &params, &request).await?;
//! println!("sent {:?}", response.message_id());
//! # Ok(())
//! # }
//! ```
//!
//! ---
//! ### Reply to a Message
//! ```rust,no_run
//! use whatsapp_cloud_rs::{
//!     message::{reply, MessageType, ReplyRequest, Text},
//!     RequestParams,
//! };
//!
//! # async fn example(params: RequestParams) -> Result<(), whatsapp_cloud_rs::Error> {
//! let http = reqwest::Client::new();
//! let request = ReplyRequest::new(
//!     "+16012345678",
//!     "wamid.HBgLMTY1MDM4Nzk0MzkVAgARGBJDQjZCMzlEQUE4OTJBMTE4RTUA",
//!     MessageType::Text,
//!     Text::new("Thanks, we got it!", false),
//! );
//! reply(&http, &params, &request).await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::{
    error::Error,
    rest::{send, RequestParams, Response, Transport},
};

/// The fixed `messaging_product` of every request body.
pub const MESSAGING_PRODUCT: &str = "whatsapp";

const INDIVIDUAL: &str = "individual";

// --- Payload Data Model ---

/// Text content
///
/// The `preview_url` field controls whether the first URL in the body renders
/// a link preview.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Text {
    /// Whether to generate a link preview for URLs
    pub preview_url: bool,
    /// Message text content
    pub body: String,
}

impl Text {
    /// Creates a new `Text` message instance.
    ///
    /// # Example
    /// ```rust
    /// use whatsapp_cloud_rs::message::Text;
    ///
    /// let message = Text::new("Check out https://example.com", true);
    /// assert_eq!(message.body, "Check out https://example.com");
    /// assert!(message.preview_url);
    /// ```
    #[inline]
    pub fn new(body: impl Into<String>, preview_url: bool) -> Self {
        Self {
            preview_url,
            body: body.into(),
        }
    }
}

impl<S: Into<String>> From<S> for Text {
    /// Converts a string-like type into a `Text` message without link preview.
    #[inline]
    fn from(value: S) -> Self {
        Self::new(value, false)
    }
}

/// A reaction to an earlier message.
///
/// Reacting to a message older than 30 days, a deleted message or another reaction
/// is accepted by the API but never delivered.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Reaction {
    /// The `wamid.` id of the message being reacted to.
    pub message_id: String,
    /// The emoji; an empty string removes an earlier reaction.
    pub emoji: String,
}

impl Reaction {
    #[inline]
    pub fn new(message_id: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            emoji: emoji.into(),
        }
    }
}

/// A physical location that can be shared with recipients.
///
/// # Example
/// ```rust
/// use whatsapp_cloud_rs::message::Location;
///
/// let store_location = Location::new(34.0522, -118.2437)
///     .name("Awesome Store")
///     .address("123 Main St, Anytown, USA");
/// ```
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub address: Option<String>,
}

impl Location {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            name: None,
            address: None,
        }
    }

    #[inline]
    pub fn name(mut self, location_name: impl Into<String>) -> Self {
        self.name = Some(location_name.into());
        self
    }

    #[inline]
    pub fn address(mut self, location_address: impl Into<String>) -> Self {
        self.address = Some(location_address.into());
        self
    }
}

/// A contact card.
///
/// Only `name.formatted_name` is required by the API.
///
/// # Example
/// ```rust
/// use whatsapp_cloud_rs::message::{Contact, Phone};
///
/// let contact = Contact::new("John Smith")
///     .phone(Phone::new("+1 (940) 555-1234").wa_id("19405551234"));
/// ```
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    /// `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<Email>,
    pub name: Name,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org: Option<Org>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<ContactUrl>,
}

impl Contact {
    #[inline]
    pub fn new(formatted_name: impl Into<String>) -> Self {
        Self {
            name: Name {
                formatted_name: formatted_name.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[inline]
    pub fn phone(mut self, phone: Phone) -> Self {
        self.phones.push(phone);
        self
    }

    #[inline]
    pub fn email(mut self, email: Email) -> Self {
        self.emails.push(email);
        self
    }

    #[inline]
    pub fn address(mut self, address: Address) -> Self {
        self.addresses.push(address);
        self
    }

    #[inline]
    pub fn url(mut self, url: ContactUrl) -> Self {
        self.urls.push(url);
        self
    }

    #[inline]
    pub fn org(mut self, org: Org) -> Self {
        self.org = Some(org);
        self
    }

    #[inline]
    pub fn birthday(mut self, birthday: impl Into<String>) -> Self {
        self.birthday = Some(birthday.into());
        self
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Name {
    pub formatted_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// `HOME` or `WORK`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Email {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl Email {
    #[inline]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            r#type: None,
        }
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Org {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Phone {
    pub phone: String,
    /// Adds a "message" button to the card when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
    /// `CELL`, `MAIN`, `IPHONE`, `HOME` or `WORK`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl Phone {
    #[inline]
    pub fn new(phone: impl Into<String>) -> Self {
        Self {
            phone: phone.into(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn wa_id(mut self, wa_id: impl Into<String>) -> Self {
        self.wa_id = Some(wa_id.into());
        self
    }

    #[inline]
    pub fn r#type(mut self, r#type: impl Into<String>) -> Self {
        self.r#type = Some(r#type.into());
        self
    }
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ContactUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

/// Message status types
///
/// Represents the delivery state of a message
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Message in transit within WhatsApp systems
    Accepted,
    /// Message delivered to device
    Delivered,
    /// Message read by recipient
    Read,
    /// Message failed to send
    Failed,
    /// Message sent to WhatsApp
    Sent,
    /// Catalog item in message is unavailable
    Warning,
    /// Message was deleted by sender
    Deleted,
    /// Message is held for later delivery
    HeldForQualityAssessment,
}

// --- Envelope ---

/// The top-level body of a message send.
///
/// `messaging_product` is always `"whatsapp"` and `recipient_type` is derived from
/// the content: every kind except reactions is sent to an `"individual"`.
///
/// # Example
/// ```rust
/// use whatsapp_cloud_rs::message::{Envelope, Text};
/// use serde_json::json;
///
/// let envelope = Envelope::text("16505551234", Text::new("hi", false));
///
/// assert_eq!(
///     serde_json::to_value(&envelope).unwrap(),
///     json!({
///         "messaging_product": "whatsapp",
///         "recipient_type": "individual",
///         "to": "16505551234",
///         "type": "text",
///         "text": {"preview_url": false, "body": "hi"}
///     })
/// );
/// ```
#[derive(Serialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Envelope {
    messaging_product: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_type: Option<&'static str>,
    to: String,
    #[serde(flatten)]
    content: Content,
}

/// The payload of an [`Envelope`], tagged by its `type` discriminant.
#[derive(Serialize, PartialEq, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: Text },
    Location { location: Location },
    Reaction { reaction: Reaction },
    #[serde(rename = "contact")]
    Contact { contacts: Vec<Contact> },
}

impl Content {
    /// The `type` discriminant this content is sent under.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Location { .. } => "location",
            Self::Reaction { .. } => "reaction",
            Self::Contact { .. } => "contact",
        }
    }

    #[inline]
    fn recipient_type(&self) -> Option<&'static str> {
        match self {
            Self::Reaction { .. } => None,
            _ => Some(INDIVIDUAL),
        }
    }
}

impl Envelope {
    /// Wraps `content` for delivery to `to`.
    pub fn new(to: impl Into<String>, content: Content) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT,
            recipient_type: content.recipient_type(),
            to: to.into(),
            content,
        }
    }

    #[inline]
    pub fn text(to: impl Into<String>, text: Text) -> Self {
        Self::new(to, Content::Text { text })
    }

    #[inline]
    pub fn location(to: impl Into<String>, location: Location) -> Self {
        Self::new(to, Content::Location { location })
    }

    #[inline]
    pub fn reaction(to: impl Into<String>, reaction: Reaction) -> Self {
        Self::new(to, Content::Reaction { reaction })
    }

    #[inline]
    pub fn contacts(to: impl Into<String>, contacts: Vec<Contact>) -> Self {
        Self::new(to, Content::Contact { contacts })
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

#[inline]
fn encode<P: Serialize>(payload: &P) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(payload).map_err(Error::Serialize)
}

// --- Envelope Builders ---

/// Input for [`send_text`].
#[derive(PartialEq, Clone, Debug, Default)]
pub struct SendTextRequest {
    pub recipient: String,
    pub message: String,
    pub preview_url: bool,
}

impl SendTextRequest {
    #[inline]
    pub fn new(recipient: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            message: message.into(),
            preview_url: false,
        }
    }

    #[inline]
    pub fn preview_url(mut self, preview_url: bool) -> Self {
        self.preview_url = preview_url;
        self
    }
}

/// Sends a text message.
pub async fn send_text<T: Transport>(
    transport: &T,
    params: &RequestParams,
    request: &SendTextRequest,
) -> Result<Response, Error> {
    let text = Text::new(request.message.as_str(), request.preview_url);
    let payload = encode(&Envelope::text(request.recipient.as_str(), text))?;
    send(transport, params, Some(payload)).await
}

/// Input for [`send_location`].
#[derive(PartialEq, Clone, Debug)]
pub struct SendLocationRequest {
    pub recipient: String,
    pub location: Location,
}

/// Sends a location pin.
pub async fn send_location<T: Transport>(
    transport: &T,
    params: &RequestParams,
    request: &SendLocationRequest,
) -> Result<Response, Error> {
    let payload = encode(&Envelope::location(
        request.recipient.as_str(),
        request.location.clone(),
    ))?;
    send(transport, params, Some(payload)).await
}

/// Input for [`react`].
#[derive(PartialEq, Clone, Debug)]
pub struct ReactRequest {
    pub recipient: String,
    pub message_id: String,
    pub emoji: String,
}

/// Reacts to an earlier message with an emoji.
///
/// The body sent looks like:
/// ```json
/// {
///   "messaging_product": "whatsapp",
///   "to": "PHONE_NUMBER",
///   "type": "reaction",
///   "reaction": {"message_id": "wamid.HBgLM...", "emoji": "😀"}
/// }
/// ```
/// Reactions carry no `recipient_type`.
pub async fn react<T: Transport>(
    transport: &T,
    params: &RequestParams,
    request: &ReactRequest,
) -> Result<Response, Error> {
    let reaction = Reaction::new(request.message_id.as_str(), request.emoji.as_str());
    let payload = encode(&Envelope::reaction(request.recipient.as_str(), reaction))?;
    send(transport, params, Some(payload)).await
}

/// Input for [`send_contact`].
#[derive(PartialEq, Clone, Debug)]
pub struct SendContactRequest {
    pub recipient: String,
    pub contacts: Vec<Contact>,
}

/// Sends one or more contact cards.
pub async fn send_contact<T: Transport>(
    transport: &T,
    params: &RequestParams,
    request: &SendContactRequest,
) -> Result<Response, Error> {
    let payload = encode(&Envelope::contacts(
        request.recipient.as_str(),
        request.contacts.clone(),
    ))?;
    send(transport, params, Some(payload)).await
}

// --- Replies ---

/// The kind of content a reply carries; its string form names the content field.
#[derive(PartialEq, Eq, Clone, Debug)]
#[non_exhaustive]
pub enum MessageType {
    Text,
    Image,
    Audio,
    Video,
    Document,
    Sticker,
    Location,
    Contacts,
    Interactive,
    Template,
    Reaction,
    /// A type this crate does not know about yet.
    Other(String),
}

impl MessageType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
            Self::Sticker => "sticker",
            Self::Location => "location",
            Self::Contacts => "contacts",
            Self::Interactive => "interactive",
            Self::Template => "template",
            Self::Reaction => "reaction",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MessageType {
    fn from(value: &str) -> Self {
        match value {
            "text" => Self::Text,
            "image" => Self::Image,
            "audio" => Self::Audio,
            "video" => Self::Video,
            "document" => Self::Document,
            "sticker" => Self::Sticker,
            "location" => Self::Location,
            "contacts" => Self::Contacts,
            "interactive" => Self::Interactive,
            "template" => Self::Template,
            "reaction" => Self::Reaction,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Input for [`reply`]: any content sent in the context of an earlier message.
///
/// The recipient sees the new message together with a bubble quoting the one
/// referenced by `context`. Serializes as
/// `{"messaging_product", "context": {"message_id"}, "to", "type", <type>: content}`.
#[derive(PartialEq, Clone, Debug)]
pub struct ReplyRequest<C> {
    pub recipient: String,
    /// The id of the message being replied to.
    pub context: String,
    pub message_type: MessageType,
    pub content: C,
}

impl<C> ReplyRequest<C> {
    pub fn new(
        recipient: impl Into<String>,
        context: impl Into<String>,
        message_type: MessageType,
        content: C,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            context: context.into(),
            message_type,
            content,
        }
    }

    /// Only the message type is checked, since it becomes a key of the envelope.
    /// Identifiers are sent as given, like every other builder does.
    fn validate(&self) -> Result<(), Error> {
        match self.message_type.as_str() {
            "" => Err(Error::InvalidArgument("reply message type cannot be empty")),
            "messaging_product" | "context" | "to" | "type" => Err(Error::InvalidArgument(
                "reply message type collides with an envelope field",
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct ReplyContext<'a> {
    message_id: &'a str,
}

impl<C: Serialize> Serialize for ReplyRequest<C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let r#type = self.message_type.as_str();

        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("messaging_product", MESSAGING_PRODUCT)?;
        map.serialize_entry(
            "context",
            &ReplyContext {
                message_id: &self.context,
            },
        )?;
        map.serialize_entry("to", &self.recipient)?;
        map.serialize_entry("type", r#type)?;
        map.serialize_entry(r#type, &self.content)?;
        map.end()
    }
}

/// Serializes the body of a reply after checking its identifiers.
pub fn build_reply_payload<C: Serialize>(options: &ReplyRequest<C>) -> Result<Vec<u8>, Error> {
    options.validate()?;
    encode(options)
}

/// Sends `options.content` as a reply to the message `options.context`.
///
/// Recipients see no quoted bubble for template replies, nor for media replies on
/// KaiOS.
pub async fn reply<T, C>(
    transport: &T,
    params: &RequestParams,
    options: &ReplyRequest<C>,
) -> Result<Response, Error>
where
    T: Transport,
    C: Serialize + Sync,
{
    let payload = build_reply_payload(options)?;
    send(transport, params, Some(payload)).await
}

// --- Read Receipts ---

#[derive(Serialize)]
struct ReadReceipt<'a> {
    messaging_product: &'static str,
    status: &'static str,
    message_id: &'a str,
}

/// Marks an incoming message (and everything before it) as read.
pub async fn mark_read<T: Transport>(
    transport: &T,
    params: &RequestParams,
    message_id: &str,
) -> Result<Response, Error> {
    if message_id.is_empty() {
        return Err(Error::InvalidArgument("message id cannot be empty"));
    }

    let payload = encode(&ReadReceipt {
        messaging_product: MESSAGING_PRODUCT,
        status: "read",
        message_id,
    })?;
    send(transport, params, Some(payload)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value, Value};

    use crate::rest::tests::Scripted;

    const OK: &[u8] = br#"{"messaging_product":"whatsapp","contacts":[{"input":"123","wa_id":"123"}],"messages":[{"id":"wamid.OK"}]}"#;

    fn params() -> RequestParams {
        RequestParams::messages("https://graph.facebook.com", "v22.0", "phone_id_222")
            .bearer("EAAD...")
    }

    #[tokio::test]
    async fn text_envelope() {
        let transport = Scripted::new(200, Some(OK));
        let request = SendTextRequest::new("123", "hi");

        let response = send_text(&transport, &params(), &request).await.unwrap();

        assert_eq!(response.message_id(), Some("wamid.OK"));
        assert_eq!(
            transport.last_body(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "123",
                "type": "text",
                "text": {"preview_url": false, "body": "hi"}
            })
        );
    }

    #[tokio::test]
    async fn reaction_envelope_has_no_recipient_type() {
        let transport = Scripted::new(200, Some(OK));
        let request = ReactRequest {
            recipient: "123".into(),
            message_id: "wamid.ABC".into(),
            emoji: "😀".into(),
        };

        react(&transport, &params(), &request).await.unwrap();

        let body = transport.last_body();
        assert_eq!(
            body,
            json!({
                "messaging_product": "whatsapp",
                "to": "123",
                "type": "reaction",
                "reaction": {"message_id": "wamid.ABC", "emoji": "😀"}
            })
        );
        assert!(body.get("recipient_type").is_none());
    }

    #[tokio::test]
    async fn location_envelope() {
        let transport = Scripted::new(200, Some(OK));
        let request = SendLocationRequest {
            recipient: "123".into(),
            location: Location::new(37.4421, -122.1615)
                .name("Philz Coffee")
                .address("101 Forest Ave, Palo Alto, CA 94301"),
        };

        send_location(&transport, &params(), &request).await.unwrap();

        assert_eq!(
            transport.last_body(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "123",
                "type": "location",
                "location": {
                    "longitude": -122.1615,
                    "latitude": 37.4421,
                    "name": "Philz Coffee",
                    "address": "101 Forest Ave, Palo Alto, CA 94301"
                }
            })
        );
    }

    #[tokio::test]
    async fn contact_envelope() {
        let transport = Scripted::new(200, Some(OK));
        let request = SendContactRequest {
            recipient: "123".into(),
            contacts: vec![Contact::new("John Smith")
                .phone(Phone::new("+1 (940) 555-1234").r#type("CELL").wa_id("19405551234"))
                .email(Email::new("john@example.com"))],
        };

        send_contact(&transport, &params(), &request).await.unwrap();

        assert_eq!(
            transport.last_body(),
            json!({
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": "123",
                "type": "contact",
                "contacts": [{
                    "name": {"formatted_name": "John Smith"},
                    "phones": [{"phone": "+1 (940) 555-1234", "wa_id": "19405551234", "type": "CELL"}],
                    "emails": [{"email": "john@example.com"}]
                }]
            })
        );
    }

    #[test]
    fn discriminant_always_matches_payload_field() {
        let envelopes = [
            Envelope::text("1", "hello".into()),
            Envelope::location("1", Location::new(1.0, 2.0)),
            Envelope::reaction("1", Reaction::new("wamid.X", "👍")),
            Envelope::contacts("1", vec![Contact::new("A")]),
        ];

        for envelope in envelopes {
            let value = to_value(&envelope).unwrap();
            let kind = envelope.content().kind();
            assert_eq!(value["type"], kind);

            let field = if kind == "contact" { "contacts" } else { kind };
            let payload_fields = ["text", "location", "reaction", "contacts"]
                .into_iter()
                .filter(|name| value.get(*name).is_some())
                .collect::<Vec<_>>();
            assert_eq!(payload_fields, [field]);
        }
    }

    #[test]
    fn reply_payload_keys_content_by_type() {
        let options = ReplyRequest::new(
            "16505551234",
            "wamid.PREVIOUS",
            MessageType::Text,
            Text::new("your-text-message-content", false),
        );

        let payload: Value = serde_json::from_slice(&build_reply_payload(&options).unwrap()).unwrap();

        assert_eq!(
            payload,
            json!({
                "messaging_product": "whatsapp",
                "context": {"message_id": "wamid.PREVIOUS"},
                "to": "16505551234",
                "type": "text",
                "text": {"preview_url": false, "body": "your-text-message-content"}
            })
        );
    }

    #[test]
    fn reply_with_quotes_and_backslashes_stays_valid_json() {
        let options = ReplyRequest::new(
            r#"12"3\"#,
            r#"wamid."},"to":"evil"#,
            MessageType::Other("custom".into()),
            json!({"anything": ["goes", 1, null]}),
        );

        let payload: Value = serde_json::from_slice(&build_reply_payload(&options).unwrap()).unwrap();

        assert_eq!(payload["to"], r#"12"3\"#);
        assert_eq!(payload["context"]["message_id"], r#"wamid."},"to":"evil"#);
        assert_eq!(payload["type"], "custom");
        assert_eq!(payload["custom"], json!({"anything": ["goes", 1, null]}));
        assert_eq!(payload.as_object().unwrap().len(), 5);
    }

    #[test]
    fn reply_rejects_unusable_message_types_before_building() {
        for message_type in [
            MessageType::Other(String::new()),
            MessageType::Other("to".into()),
            MessageType::Other("context".into()),
        ] {
            let options = ReplyRequest::new("123", "wamid.X", message_type, "x");
            let err = build_reply_payload(&options).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{err:?}");
        }
    }

    #[test]
    fn reply_sends_empty_identifiers_as_given() {
        let options = ReplyRequest::new("", "", MessageType::Text, Text::from("hi"));

        let payload: Value = serde_json::from_slice(&build_reply_payload(&options).unwrap()).unwrap();

        assert_eq!(payload["to"], "");
        assert_eq!(payload["context"]["message_id"], "");
        assert_eq!(payload["text"]["body"], "hi");
    }

    #[tokio::test]
    async fn reply_is_dispatched_and_errors_pass_through() {
        let transport = Scripted::new(
            400,
            Some(br#"{"error":{"code":131009,"message":"Parameter value is not valid"}}"#),
        );
        let options = ReplyRequest::new("123", "wamid.X", MessageType::Text, Text::from("hi"));

        let err = reply(&transport, &params(), &options).await.unwrap_err();

        let api = err.api_error().unwrap();
        assert_eq!(api.code, 400);
        assert_eq!(api.error.as_ref().unwrap().code, 131009);
        assert_eq!(transport.last_body()["text"]["body"], "hi");
    }

    #[tokio::test]
    async fn read_receipt() {
        let transport = Scripted::new(200, Some(br#"{"success":true}"#));

        let response = mark_read(&transport, &params(), "wamid.IN").await.unwrap();

        assert_eq!(response.message.success, Some(true));
        assert_eq!(
            transport.last_body(),
            json!({"messaging_product": "whatsapp", "status": "read", "message_id": "wamid.IN"})
        );
    }

    #[test]
    fn message_type_round_trips_through_str() {
        for kind in ["text", "image", "contacts", "template", "reaction", "order"] {
            assert_eq!(MessageType::from(kind).as_str(), kind);
        }
        assert_eq!(MessageType::from("order"), MessageType::Other("order".into()));
    }
}
