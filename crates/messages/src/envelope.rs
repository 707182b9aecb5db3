//! The canonical outbound message record.
//!
//! An [`Envelope`] is built once per deliverable item, handed to the
//! [`MessageStore`](crate::store::MessageStore) and never touched again.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
    yatools_common::Recipient,
};

/// Message kinds a tool can emit. Fixes the shape of [`Envelope::data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Video,
    Document,
    Interactive,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Document => "document",
            Self::Interactive => "interactive",
        }
    }

    /// Kinds whose data is a `{url, mime_type?, filename?}` reference.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Document)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversational role of the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Assistant,
    MediaAssistant,
    System,
    /// Written by the alert dispatcher's messaging channel.
    Alert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagingSystem {
    #[serde(rename = "whatsapp")]
    WhatsApp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub text: String,
}

/// A media reference. Unknown keys supplied by the caller are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaData {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaData {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: Some(mime_type.into()),
            filename: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    #[default]
    Reply,
    Payment,
}

impl ButtonType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reply => "reply",
            Self::Payment => "payment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    pub text: String,
}

/// Payment link attached to a payment-type button message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub title: String,
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Interactive (button) message body.
///
/// `buttons` is already in the provider's shape: reply buttons are
/// `{type: "reply", reply: {id, title}}`, payment buttons are passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveData {
    pub text: String,
    pub button_type: ButtonType,
    pub buttons: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentLink>,
}

/// Per-kind message payload.
///
/// Serialized without a tag: the discriminator is the envelope's `type`, so
/// decoding goes through [`MessageData::decode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageData {
    Text(TextData),
    Media(MediaData),
    Interactive(InteractiveData),
    /// Caller-supplied media mapping carrying a `url` that does not fit [`MediaData`].
    Raw(Map<String, Value>),
    /// Content whose shape does not match its kind, kept verbatim.
    Opaque { content: Value },
}

impl MessageData {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextData { text: text.into() })
    }

    /// Decode wire `data` using the envelope's `kind` as the discriminator.
    pub fn decode(kind: MessageKind, value: Value) -> serde_json::Result<Self> {
        match kind {
            MessageKind::Text => serde_json::from_value(value).map(Self::Text),
            MessageKind::Image | MessageKind::Video | MessageKind::Document => match value {
                Value::Object(map) => Ok(
                    match serde_json::from_value::<MediaData>(Value::Object(map.clone())) {
                        Ok(media) => Self::Media(media),
                        Err(_) => Self::Raw(map),
                    },
                ),
                other => serde_json::from_value(other).map(Self::Media),
            },
            MessageKind::Interactive => {
                if let Ok(data) = serde_json::from_value::<InteractiveData>(value.clone()) {
                    return Ok(Self::Interactive(data));
                }
                Ok(match value {
                    Value::Object(mut map) if map.len() == 1 && map.contains_key("content") => {
                        Self::Opaque {
                            content: map.remove("content").unwrap_or(Value::Null),
                        }
                    },
                    content => Self::Opaque { content },
                })
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(data) => Some(&data.text),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaData> {
        match self {
            Self::Media(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_interactive(&self) -> Option<&InteractiveData> {
        match self {
            Self::Interactive(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceRef {
    pub id: String,
}

/// Canonical persisted outbound message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct Envelope {
    pub system: MessagingSystem,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub data: MessageData,
    pub client: ClientRef,
    pub commerce: CommerceRef,
    pub external_id: String,
    pub direction: Direction,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Envelope as read back from storage, before `data` is resolved by `type`.
#[derive(Deserialize)]
struct WireEnvelope {
    system: MessagingSystem,
    #[serde(rename = "type")]
    kind: MessageKind,
    data: Value,
    client: ClientRef,
    commerce: CommerceRef,
    external_id: String,
    direction: Direction,
    role: Role,
    created_at: DateTime<Utc>,
}

impl TryFrom<WireEnvelope> for Envelope {
    type Error = serde_json::Error;

    fn try_from(wire: WireEnvelope) -> Result<Self, Self::Error> {
        Ok(Self {
            system: wire.system,
            kind: wire.kind,
            data: MessageData::decode(wire.kind, wire.data)?,
            client: wire.client,
            commerce: wire.commerce,
            external_id: wire.external_id,
            direction: wire.direction,
            role: wire.role,
            created_at: wire.created_at,
        })
    }
}

impl Envelope {
    /// Build an outbound envelope stamped with the current time.
    pub fn outbound(
        external_id: impl Into<String>,
        recipient: &Recipient,
        kind: MessageKind,
        data: MessageData,
        role: Role,
    ) -> Self {
        Self {
            system: MessagingSystem::WhatsApp,
            kind,
            data,
            client: ClientRef {
                phone_number: recipient.phone_number.clone(),
            },
            commerce: CommerceRef {
                id: recipient.company_id.clone(),
            },
            external_id: external_id.into(),
            direction: Direction::Outbound,
            role,
            created_at: Utc::now(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn recipient() -> Recipient {
        Recipient::new("5215512345678", "acme")
    }

    #[test]
    fn envelope_serializes_wire_shape() {
        let env = Envelope::outbound(
            "ext-1",
            &recipient(),
            MessageKind::Text,
            MessageData::text("hola"),
            Role::Assistant,
        );
        let value = serde_json::to_value(&env).unwrap();

        assert_eq!(value["system"], "whatsapp");
        assert_eq!(value["type"], "text");
        assert_eq!(value["data"], json!({"text": "hola"}));
        assert_eq!(value["client"]["phone_number"], "5215512345678");
        assert_eq!(value["commerce"]["id"], "acme");
        assert_eq!(value["direction"], "outbound");
        assert_eq!(value["role"], "assistant");
        assert!(value["created_at"].is_string());
    }

    #[test]
    fn media_role_is_snake_case() {
        let value = serde_json::to_value(Role::MediaAssistant).unwrap();
        assert_eq!(value, "media_assistant");
    }

    #[test]
    fn media_data_keeps_extra_keys() {
        let media: MediaData =
            serde_json::from_value(json!({"url": "https://x/y.jpg", "caption": "hi"})).unwrap();
        assert_eq!(media.mime_type, None);
        assert_eq!(
            serde_json::to_value(&media).unwrap(),
            json!({"url": "https://x/y.jpg", "caption": "hi"})
        );
    }

    #[test]
    fn interactive_envelope_reads_back_unchanged() {
        let data = MessageData::Interactive(InteractiveData {
            text: "Pick\nOptions: Yes".into(),
            button_type: ButtonType::Reply,
            buttons: vec![json!({"type": "reply", "reply": {"id": "y", "title": "Yes"}})],
            header: Some(json!({"type": "text", "text": "Hi"})),
            footer: Some(Footer {
                text: "footer".into(),
            }),
            payment: None,
        });
        let env = Envelope::outbound(
            "ext-2",
            &recipient(),
            MessageKind::Interactive,
            data,
            Role::Assistant,
        );

        let back: Envelope = serde_json::from_value(serde_json::to_value(&env).unwrap()).unwrap();
        assert_eq!(back, env);
        assert!(back.data.as_interactive().is_some());
    }

    #[test]
    fn data_is_decoded_by_kind() {
        let raw = json!({"url": 42});
        assert_eq!(
            MessageData::decode(MessageKind::Image, raw.clone()).unwrap(),
            MessageData::Raw(raw.as_object().unwrap().clone())
        );
        assert_eq!(
            MessageData::decode(MessageKind::Interactive, json!({"content": [1]})).unwrap(),
            MessageData::Opaque { content: json!([1]) }
        );
        assert_eq!(
            MessageData::decode(MessageKind::Text, json!({"text": "a", "extra": 1})).unwrap(),
            MessageData::text("a")
        );
        assert!(MessageData::decode(MessageKind::Text, json!({"url": "x"})).is_err());
    }

    #[test]
    fn interactive_data_omits_absent_sections() {
        let data = InteractiveData {
            text: "pick one".into(),
            button_type: ButtonType::Reply,
            buttons: vec![],
            header: None,
            footer: None,
            payment: None,
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(
            value,
            json!({"text": "pick one", "button_type": "reply", "buttons": []})
        );
    }
}
