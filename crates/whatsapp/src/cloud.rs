//! WhatsApp Cloud API (Graph API) client for a single phone number.

use {
    secrecy::{ExposeSecret, Secret},
    serde_json::{Map, Value, json},
    tracing::debug,
};

use crate::{
    error::{Context, Error, Result},
    service::RoutedButton,
};

pub const DEFAULT_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Reply buttons allowed by the Cloud API in one interactive message.
const MAX_REPLY_BUTTONS: usize = 3;

/// Sends messages from one WhatsApp business phone number.
#[derive(Debug, Clone)]
pub struct CloudApiClient {
    http: reqwest::Client,
    api_base: String,
    phone_id: String,
    token: Secret<String>,
}

impl CloudApiClient {
    pub fn new(
        http: reqwest::Client,
        api_base: &str,
        phone_id: impl Into<String>,
        token: Secret<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            phone_id: phone_id.into(),
            token,
        }
    }

    pub fn phone_id(&self) -> &str {
        &self.phone_id
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_id)
    }

    pub async fn send_text(&self, to: &str, text: &str) -> Result<String> {
        self.post(to, "text", json!({ "body": text })).await
    }

    pub async fn send_image(&self, to: &str, url: &str, caption: Option<&str>) -> Result<String> {
        self.post(to, "image", media_object(url, caption, None)).await
    }

    pub async fn send_video(&self, to: &str, url: &str, caption: Option<&str>) -> Result<String> {
        self.post(to, "video", media_object(url, caption, None)).await
    }

    pub async fn send_document(
        &self,
        to: &str,
        url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String> {
        self.post(to, "document", media_object(url, caption, filename))
            .await
    }

    pub async fn send_buttons(
        &self,
        to: &str,
        text: &str,
        buttons: &[RoutedButton],
    ) -> Result<String> {
        if buttons.is_empty() {
            return Err(Error::invalid_input("at least one button is required"));
        }
        let buttons: Vec<Value> = buttons
            .iter()
            .take(MAX_REPLY_BUTTONS)
            .map(|b| {
                json!({
                    "type": "reply",
                    "reply": { "id": b.callback_data, "title": b.title },
                })
            })
            .collect();
        let interactive = json!({
            "type": "button",
            "body": { "text": text },
            "action": { "buttons": buttons },
        });
        self.post(to, "interactive", interactive).await
    }

    async fn post(&self, to: &str, kind: &str, body: Value) -> Result<String> {
        let mut payload = json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": to,
            "type": kind,
        });
        if let Some(object) = payload.as_object_mut() {
            object.insert(kind.to_string(), body);
        }

        let response = self
            .http
            .post(self.messages_url())
            .bearer_auth(self.token.expose_secret())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Send {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response.json().await?;
        let id = value
            .pointer("/messages/0/id")
            .and_then(Value::as_str)
            .context("WhatsApp API response has no message id")?
            .to_string();
        debug!(phone_id = %self.phone_id, kind, message_id = %id, "whatsapp message sent");
        Ok(id)
    }
}

fn media_object(url: &str, caption: Option<&str>, filename: Option<&str>) -> Value {
    let mut object = Map::new();
    object.insert("link".into(), Value::String(url.to_string()));
    if let Some(caption) = caption {
        object.insert("caption".into(), Value::String(caption.to_string()));
    }
    if let Some(filename) = filename {
        object.insert("filename".into(), Value::String(filename.to_string()));
    }
    Value::Object(object)
}
