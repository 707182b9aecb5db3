//! In-memory [`WhatsAppService`] for local runs and tests.

use std::collections::HashMap;

use {async_trait::async_trait, tokio::sync::RwLock, tracing::debug};

use crate::{
    error::{Error, Result},
    service::{ClientInfo, RoutedButton, WhatsAppService},
};

/// One send accepted by [`MockWhatsAppService`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSend {
    pub message_id: String,
    pub client_id: String,
    pub to: String,
    pub kind: &'static str,
    pub content: String,
    pub caption: Option<String>,
    pub filename: Option<String>,
    pub buttons: Vec<RoutedButton>,
}

/// Keeps credentials in memory and records sends instead of delivering them.
#[derive(Default)]
pub struct MockWhatsAppService {
    // client id -> (phone id, token)
    clients: RwLock<HashMap<String, (String, String)>>,
    sent: RwLock<Vec<RecordedSend>>,
}

impl MockWhatsAppService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first.
    pub async fn sent(&self) -> Vec<RecordedSend> {
        self.sent.read().await.clone()
    }

    async fn record(&self, client_id: &str, to: &str, draft: Draft<'_>) -> Result<String> {
        if !self.clients.read().await.contains_key(client_id) {
            return Err(Error::client_not_found(client_id));
        }
        let message_id = uuid::Uuid::new_v4().to_string();
        debug!(client_id, to, kind = draft.kind, %message_id, "mock whatsapp send");
        self.sent.write().await.push(RecordedSend {
            message_id: message_id.clone(),
            client_id: client_id.to_string(),
            to: to.to_string(),
            kind: draft.kind,
            content: draft.content.to_string(),
            caption: draft.caption.map(str::to_string),
            filename: draft.filename.map(str::to_string),
            buttons: draft.buttons.to_vec(),
        });
        Ok(message_id)
    }
}

struct Draft<'a> {
    kind: &'static str,
    content: &'a str,
    caption: Option<&'a str>,
    filename: Option<&'a str>,
    buttons: &'a [RoutedButton],
}

impl<'a> Draft<'a> {
    fn new(kind: &'static str, content: &'a str) -> Self {
        Self {
            kind,
            content,
            caption: None,
            filename: None,
            buttons: &[],
        }
    }
}

#[async_trait]
impl WhatsAppService for MockWhatsAppService {
    async fn get_client(&self, client_id: &str) -> Result<ClientInfo> {
        self.clients
            .read()
            .await
            .get(client_id)
            .map(|(phone_id, _)| ClientInfo {
                client_id: client_id.to_string(),
                phone_id: phone_id.clone(),
            })
            .ok_or_else(|| Error::client_not_found(client_id))
    }

    async fn register_client(
        &self,
        client_id: &str,
        phone_id: &str,
        token: &str,
    ) -> Result<ClientInfo> {
        self.clients.write().await.insert(
            client_id.to_string(),
            (phone_id.to_string(), token.to_string()),
        );
        Ok(ClientInfo {
            client_id: client_id.to_string(),
            phone_id: phone_id.to_string(),
        })
    }

    async fn list_clients(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.clients.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn send_text(&self, client_id: &str, to: &str, text: &str) -> Result<String> {
        self.record(client_id, to, Draft::new("text", text)).await
    }

    async fn send_image(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String> {
        let draft = Draft {
            caption,
            ..Draft::new("image", url)
        };
        self.record(client_id, to, draft).await
    }

    async fn send_video(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String> {
        let draft = Draft {
            caption,
            ..Draft::new("video", url)
        };
        self.record(client_id, to, draft).await
    }

    async fn send_document(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String> {
        let draft = Draft {
            caption,
            filename,
            ..Draft::new("document", url)
        };
        self.record(client_id, to, draft).await
    }

    async fn send_buttons(
        &self,
        client_id: &str,
        to: &str,
        text: &str,
        buttons: &[RoutedButton],
    ) -> Result<String> {
        let draft = Draft {
            buttons,
            ..Draft::new("interactive", text)
        };
        self.record(client_id, to, draft).await
    }
}
