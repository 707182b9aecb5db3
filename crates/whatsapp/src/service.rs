use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::error::Result;

/// Public view of a registered messaging client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub client_id: String,
    pub phone_id: String,
}

/// A quick-reply button in the routed wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedButton {
    pub title: String,
    pub callback_data: String,
}

/// Registry of per-client WhatsApp credentials plus the send operations
/// routed through them. Every send returns the provider message id.
#[async_trait]
pub trait WhatsAppService: Send + Sync {
    async fn get_client(&self, client_id: &str) -> Result<ClientInfo>;

    async fn register_client(
        &self,
        client_id: &str,
        phone_id: &str,
        token: &str,
    ) -> Result<ClientInfo>;

    /// Client ids known to this process, sorted.
    async fn list_clients(&self) -> Result<Vec<String>>;

    async fn send_text(&self, client_id: &str, to: &str, text: &str) -> Result<String>;

    async fn send_image(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String>;

    async fn send_video(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String>;

    async fn send_document(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String>;

    async fn send_buttons(
        &self,
        client_id: &str,
        to: &str,
        text: &str,
        buttons: &[RoutedButton],
    ) -> Result<String>;
}
