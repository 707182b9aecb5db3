//! Normalize loosely-shaped tool content into envelope data.
//!
//! Never fails: content that does not fit its kind is kept as
//! [`MessageData::Raw`] or [`MessageData::Opaque`] rather than rejected.

use {
    serde_json::{Map, Value},
    yatools_common::Recipient,
};

use crate::envelope::{Envelope, MediaData, MessageData, MessageKind, Role};

/// Default MIME type for a media kind.
pub fn mime_type_for(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Image => "image/jpeg",
        MessageKind::Video => "video/mp4",
        MessageKind::Document => "application/pdf",
        MessageKind::Text | MessageKind::Interactive => "application/octet-stream",
    }
}

/// Shape `content` for `kind`.
///
/// Media mappings that carry a `url` key pass through untouched; anything
/// else is treated as the URL itself and gets the kind's default MIME type.
pub fn format_data(content: Value, kind: MessageKind) -> MessageData {
    match kind {
        MessageKind::Text => MessageData::text(value_text(content)),
        MessageKind::Image | MessageKind::Video | MessageKind::Document => {
            format_media(content, kind)
        },
        MessageKind::Interactive => match serde_json::from_value(content.clone()) {
            Ok(data) => MessageData::Interactive(data),
            Err(_) => MessageData::Opaque { content },
        },
    }
}

/// Build an outbound envelope for `content` of the given kind.
pub fn build_envelope(
    external_id: impl Into<String>,
    content: Value,
    kind: MessageKind,
    role: Role,
    recipient: &Recipient,
) -> Envelope {
    Envelope::outbound(
        external_id,
        recipient,
        kind,
        format_data(content, kind),
        role,
    )
}

fn format_media(content: Value, kind: MessageKind) -> MessageData {
    match content {
        Value::Object(map) if map.contains_key("url") => passthrough_media(map),
        other => MessageData::Media(MediaData::new(value_text(other), mime_type_for(kind))),
    }
}

fn passthrough_media(map: Map<String, Value>) -> MessageData {
    match serde_json::from_value::<MediaData>(Value::Object(map.clone())) {
        Ok(media) => MessageData::Media(media),
        // `url`, `mime_type` or `filename` is not a string.
        Err(_) => MessageData::Raw(map),
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
