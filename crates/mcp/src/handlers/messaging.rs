//! Message-sending entrypoints.
//!
//! With a `client_id` the call is routed straight through the WhatsApp
//! service and nothing is persisted. Without one the matching delivery tool
//! runs against the company's sender and message store.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::Deserialize,
    serde_json::{Map, Value, json},
    tracing::warn,
    yatools_messages::{ButtonType, PaymentLink},
    yatools_tools::{
        BatchOutcome, ButtonTool, DocumentTool, ImageTool, MessageTool, OneOrMany, TextTool,
        VideoTool,
    },
    yatools_whatsapp::RoutedButton,
};

use crate::{
    handler::{ToolHandler, ToolResponse, parse_args},
    services::ToolServices,
};

pub const DEFAULT_DOCUMENT_FILENAME: &str = "document.pdf";

/// Success while anything went out; `failed` lists the entries that did not.
fn batch_response(noun: &str, outcome: yatools_tools::Result<BatchOutcome>) -> ToolResponse {
    match outcome {
        Ok(outcome) if outcome.is_total_failure() => {
            let first = &outcome.failed[0];
            ToolResponse::error(format!("Failed to send {noun}: {}", first.error))
        },
        Ok(outcome) if outcome.failed.is_empty() => {
            ToolResponse::success().with("message_ids", outcome.sent)
        },
        Ok(outcome) => ToolResponse::success()
            .with("message_ids", &outcome.sent)
            .with("failed", &outcome.failed),
        Err(e) => ToolResponse::error(format!("Failed to send {noun}: {e}")),
    }
}

/// A non-empty `client_id` selects the routed path.
fn routed_client(client_id: &Option<String>) -> Option<&str> {
    client_id.as_deref().filter(|id| !id.is_empty())
}

fn recipient_properties() -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(
        "company_id".into(),
        json!({"type": "string", "description": "Company identifier"}),
    );
    props.insert(
        "phone_number".into(),
        json!({"type": "string", "description": "Recipient's phone number"}),
    );
    props
}

fn client_id_property() -> Value {
    json!({
        "type": "string",
        "description": "Optional WhatsApp client id; when set the message is sent through that client"
    })
}

fn schema(mut props: Map<String, Value>, extra: Value, required: &[&str]) -> Value {
    if let Value::Object(extra) = extra {
        props.extend(extra);
    }
    let mut required_keys = vec!["company_id", "phone_number"];
    required_keys.extend_from_slice(required);
    json!({
        "type": "object",
        "properties": props,
        "required": required_keys,
    })
}

// ── send_text ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendTextArgs {
    company_id: String,
    phone_number: String,
    message: String,
    #[serde(default)]
    client_id: Option<String>,
}

pub struct SendText {
    services: Arc<ToolServices>,
}

impl SendText {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendText {
    fn name(&self) -> &str {
        "send_text"
    }

    fn description(&self) -> &str {
        "Send a text message to a phone number on behalf of a company."
    }

    fn parameters_schema(&self) -> Value {
        schema(
            recipient_properties(),
            json!({
                "message": {"type": "string", "description": "Text to send"},
                "client_id": client_id_property(),
            }),
            &["message"],
        )
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: SendTextArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };

        if let Some(client_id) = routed_client(&args.client_id) {
            return match self
                .services
                .whatsapp
                .send_text(client_id, &args.phone_number, &args.message)
                .await
            {
                Ok(id) => ToolResponse::success().with("message_id", id),
                Err(e) => ToolResponse::error(format!("Failed to send message: {e}")),
            };
        }

        let ctx = self.services.context(&args.company_id, &args.phone_number);
        match TextTool::new(args.message).execute(&ctx).await {
            Ok(id) => ToolResponse::success().with("message_id", id),
            Err(e) => ToolResponse::error(format!("Failed to send message: {e}")),
        }
    }
}

// ── send_image / send_video ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendMediaArgs {
    company_id: String,
    phone_number: String,
    #[serde(alias = "image_urls", alias = "video_urls")]
    urls: OneOrMany<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    caption: Option<String>,
}

/// The routed path sends a single item: the first non-blank URL.
fn first_url(urls: &OneOrMany<String>) -> Option<&str> {
    let url = match urls {
        OneOrMany::One(url) => Some(url.as_str()),
        OneOrMany::Many(urls) => urls.iter().map(String::as_str).find(|u| !u.trim().is_empty()),
    };
    url.filter(|u| !u.trim().is_empty())
}

#[derive(Clone, Copy)]
enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn noun(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    fn urls_key(self) -> &'static str {
        match self {
            Self::Image => "image_urls",
            Self::Video => "video_urls",
        }
    }
}

async fn send_media(services: &ToolServices, kind: MediaKind, args: SendMediaArgs) -> ToolResponse {
    let noun = kind.noun();

    if let Some(client_id) = routed_client(&args.client_id) {
        let Some(url) = first_url(&args.urls) else {
            return ToolResponse::error(format!("No valid {noun} URL to send"));
        };
        let caption = args.caption.as_deref();
        let sent = match kind {
            MediaKind::Image => {
                services
                    .whatsapp
                    .send_image(client_id, &args.phone_number, url, caption)
                    .await
            },
            MediaKind::Video => {
                services
                    .whatsapp
                    .send_video(client_id, &args.phone_number, url, caption)
                    .await
            },
        };
        return match sent {
            Ok(id) => ToolResponse::success().with("message_id", id),
            Err(e) => ToolResponse::error(format!("Failed to send {noun}: {e}")),
        };
    }

    let ctx = services.context(&args.company_id, &args.phone_number);
    let sent = match kind {
        MediaKind::Image => ImageTool::new(args.urls).execute(&ctx).await,
        MediaKind::Video => VideoTool::new(args.urls).execute(&ctx).await,
    };
    batch_response(noun, sent)
}

fn media_schema(kind: MediaKind) -> Value {
    let mut extra = Map::new();
    extra.insert(
        kind.urls_key().into(),
        json!({
            "description": format!("Single {} URL or list of URLs", kind.noun()),
            "anyOf": [
                {"type": "string"},
                {"type": "array", "items": {"type": "string"}},
            ],
        }),
    );
    extra.insert("client_id".into(), client_id_property());
    extra.insert(
        "caption".into(),
        json!({"type": "string", "description": "Caption, only used with client_id"}),
    );
    schema(recipient_properties(), Value::Object(extra), &[kind.urls_key()])
}

pub struct SendImage {
    services: Arc<ToolServices>,
}

impl SendImage {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendImage {
    fn name(&self) -> &str {
        "send_image"
    }

    fn description(&self) -> &str {
        "Send one or more images by URL."
    }

    fn parameters_schema(&self) -> Value {
        media_schema(MediaKind::Image)
    }

    async fn call(&self, args: Value) -> ToolResponse {
        match parse_args(self.name(), args) {
            Ok(args) => send_media(&self.services, MediaKind::Image, args).await,
            Err(resp) => resp,
        }
    }
}

pub struct SendVideo {
    services: Arc<ToolServices>,
}

impl SendVideo {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendVideo {
    fn name(&self) -> &str {
        "send_video"
    }

    fn description(&self) -> &str {
        "Send one or more videos by URL."
    }

    fn parameters_schema(&self) -> Value {
        media_schema(MediaKind::Video)
    }

    async fn call(&self, args: Value) -> ToolResponse {
        match parse_args(self.name(), args) {
            Ok(args) => send_media(&self.services, MediaKind::Video, args).await,
            Err(resp) => resp,
        }
    }
}

// ── send_document ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SendDocumentArgs {
    company_id: String,
    phone_number: String,
    files: Value,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

/// Normalize `files` into a list of `{url, filename}` entries for the tool path.
fn document_entries(files: Value, filename: Option<&str>) -> Option<Vec<Value>> {
    match files {
        Value::String(url) => Some(vec![json!({
            "url": url,
            "filename": filename.unwrap_or(DEFAULT_DOCUMENT_FILENAME),
        })]),
        Value::Object(_) => Some(vec![files]),
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// `(url, filename)` for the routed path: the first usable entry.
fn routed_document(files: &Value, filename: Option<&str>) -> Option<(String, String)> {
    let fallback = || filename.unwrap_or(DEFAULT_DOCUMENT_FILENAME).to_string();
    let from_mapping = |entry: &Value| -> Option<(String, String)> {
        let url = entry.get("url")?.as_str()?.trim();
        if url.is_empty() {
            return None;
        }
        let name = entry
            .get("filename")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(fallback);
        Some((url.to_string(), name))
    };

    match files {
        Value::String(url) if !url.trim().is_empty() => Some((url.clone(), fallback())),
        Value::Object(_) => from_mapping(files),
        Value::Array(items) => items.iter().find_map(|item| {
            let found = from_mapping(item);
            if found.is_none() {
                warn!("skipping malformed document entry on routed send");
            }
            found
        }),
        _ => None,
    }
}

pub struct SendDocument {
    services: Arc<ToolServices>,
}

impl SendDocument {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendDocument {
    fn name(&self) -> &str {
        "send_document"
    }

    fn description(&self) -> &str {
        "Send documents. `files` may be a URL, a {url, filename} object or a list of them."
    }

    fn parameters_schema(&self) -> Value {
        schema(
            recipient_properties(),
            json!({
                "files": {
                    "description": "Document URL, {url, filename} object, or list of objects",
                    "anyOf": [
                        {"type": "string"},
                        {"type": "object"},
                        {"type": "array", "items": {"type": "object"}},
                    ],
                },
                "client_id": client_id_property(),
                "caption": {"type": "string", "description": "Caption, only used with client_id"},
                "filename": {"type": "string", "description": "Filename used when files is a bare URL"},
            }),
            &["files"],
        )
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: SendDocumentArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };

        if let Some(client_id) = routed_client(&args.client_id) {
            let Some((url, filename)) = routed_document(&args.files, args.filename.as_deref())
            else {
                return ToolResponse::error("No valid document to send");
            };
            return match self
                .services
                .whatsapp
                .send_document(
                    client_id,
                    &args.phone_number,
                    &url,
                    args.caption.as_deref(),
                    Some(&filename),
                )
                .await
            {
                Ok(id) => ToolResponse::success().with("message_id", id),
                Err(e) => ToolResponse::error(format!("Failed to send document: {e}")),
            };
        }

        let Some(files) = document_entries(args.files, args.filename.as_deref()) else {
            return ToolResponse::error("Invalid document files format");
        };
        let ctx = self.services.context(&args.company_id, &args.phone_number);
        batch_response("document", DocumentTool::new(files).execute(&ctx).await)
    }
}

// ── send_button ─────────────────────────────────────────────────────

fn default_button_type() -> String {
    ButtonType::Reply.as_str().to_string()
}

#[derive(Debug, Deserialize)]
struct SendButtonArgs {
    company_id: String,
    phone_number: String,
    body_text: String,
    buttons: Vec<Value>,
    #[serde(default = "default_button_type")]
    button_type: String,
    #[serde(default)]
    header: Option<Value>,
    #[serde(default)]
    footer_text: Option<String>,
    #[serde(default)]
    payment_data: Option<Value>,
    #[serde(default)]
    client_id: Option<String>,
}

fn parse_button_type(raw: &str) -> Option<ButtonType> {
    match raw {
        "reply" => Some(ButtonType::Reply),
        "payment" => Some(ButtonType::Payment),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `{id, title}` becomes `{title, callback_data: id}`; entries already in
/// routed shape pass through; anything else is skipped.
fn routed_buttons(buttons: &[Value]) -> Vec<RoutedButton> {
    buttons
        .iter()
        .enumerate()
        .filter_map(|(index, button)| {
            let converted = match (
                button.get("id").and_then(scalar_text),
                button.get("title").and_then(scalar_text),
            ) {
                (Some(id), Some(title)) => Some(RoutedButton {
                    title,
                    callback_data: id,
                }),
                _ => serde_json::from_value::<RoutedButton>(button.clone()).ok(),
            };
            if converted.is_none() {
                warn!(index, "skipping malformed button on routed send");
            }
            converted
        })
        .collect()
}

pub struct SendButton {
    services: Arc<ToolServices>,
}

impl SendButton {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendButton {
    fn name(&self) -> &str {
        "send_button"
    }

    fn description(&self) -> &str {
        "Send an interactive message with quick-reply buttons or a payment link."
    }

    fn parameters_schema(&self) -> Value {
        schema(
            recipient_properties(),
            json!({
                "body_text": {"type": "string", "description": "Message body"},
                "buttons": {
                    "type": "array",
                    "items": {"type": "object"},
                    "description": "Buttons as {id, title}; reply messages keep the first 3",
                },
                "button_type": {"type": "string", "enum": ["reply", "payment"], "default": "reply"},
                "header": {"type": "object", "description": "Optional header"},
                "footer_text": {"type": "string", "description": "Optional footer"},
                "payment_data": {
                    "type": "object",
                    "description": "Payment link {title, url} for payment buttons",
                },
                "client_id": client_id_property(),
            }),
            &["body_text", "buttons"],
        )
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: SendButtonArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };

        if let Some(client_id) = routed_client(&args.client_id) {
            let buttons = routed_buttons(&args.buttons);
            if buttons.is_empty() {
                return ToolResponse::error("No valid buttons to send");
            }
            return match self
                .services
                .whatsapp
                .send_buttons(client_id, &args.phone_number, &args.body_text, &buttons)
                .await
            {
                Ok(id) => ToolResponse::success().with("message_id", id),
                Err(e) => ToolResponse::error(format!("Failed to send buttons: {e}")),
            };
        }

        let Some(button_type) = parse_button_type(&args.button_type) else {
            return ToolResponse::error(format!(
                "Invalid arguments for send_button: unknown button_type '{}'",
                args.button_type
            ));
        };
        let payment = match (button_type, args.payment_data) {
            (ButtonType::Payment, Some(data)) => {
                match serde_json::from_value::<PaymentLink>(data) {
                    Ok(link) => Some(link),
                    Err(e) => {
                        return ToolResponse::error(format!(
                            "Invalid arguments for send_button: payment_data: {e}"
                        ));
                    },
                }
            },
            _ => None,
        };

        let tool = ButtonTool::new(
            args.body_text,
            args.buttons,
            button_type,
            args.header,
            args.footer_text,
            payment,
        );
        let ctx = self.services.context(&args.company_id, &args.phone_number);
        match tool.execute(&ctx).await {
            Ok(id) => ToolResponse::success().with("message_id", id),
            Err(e) => ToolResponse::error(format!("Failed to send buttons: {e}")),
        }
    }
}
