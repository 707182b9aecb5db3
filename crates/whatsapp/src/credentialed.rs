//! [`WhatsAppService`] backed by a [`SecretStore`] and the Cloud API.

use std::{collections::HashMap, sync::Arc};

use {
    async_trait::async_trait,
    secrecy::Secret,
    tokio::sync::RwLock,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use yatools_metrics::{counter, labels, messages as message_metrics};

use crate::{
    cloud::{CloudApiClient, DEFAULT_API_BASE},
    error::{Error, Result},
    secrets::{PHONE_ID_SECRET, SecretKey, SecretStore, TOKEN_SECRET, read_plain},
    service::{ClientInfo, RoutedButton, WhatsAppService},
};

/// Resolves client credentials from the secret store on first use and caches
/// one [`CloudApiClient`] per client id.
pub struct CredentialedWhatsAppService<S: SecretStore> {
    secrets: Arc<S>,
    http: reqwest::Client,
    api_base: String,
    clients: RwLock<HashMap<String, CloudApiClient>>,
}

impl<S: SecretStore> CredentialedWhatsAppService<S> {
    pub fn new(secrets: Arc<S>) -> Self {
        Self::with_api_base(secrets, DEFAULT_API_BASE)
    }

    pub fn with_api_base(secrets: Arc<S>, api_base: &str) -> Self {
        Self {
            secrets,
            http: reqwest::Client::new(),
            api_base: api_base.to_string(),
            clients: RwLock::new(HashMap::new()),
        }
    }

    async fn client(&self, client_id: &str) -> Result<CloudApiClient> {
        if let Some(client) = self.clients.read().await.get(client_id) {
            return Ok(client.clone());
        }

        let token = read_plain(&*self.secrets, &SecretKey::new(client_id, TOKEN_SECRET)).await?;
        let phone_id =
            read_plain(&*self.secrets, &SecretKey::new(client_id, PHONE_ID_SECRET)).await?;
        let (Some(token), Some(phone_id)) = (token, phone_id) else {
            return Err(Error::client_not_found(client_id));
        };

        let client = CloudApiClient::new(
            self.http.clone(),
            &self.api_base,
            phone_id,
            Secret::new(token),
        );
        debug!(client_id, phone_id = client.phone_id(), "whatsapp client loaded from secrets");
        self.clients
            .write()
            .await
            .insert(client_id.to_string(), client.clone());
        Ok(client)
    }

    async fn upsert_secret(&self, key: SecretKey, value: &str) -> Result<()> {
        let value = Secret::new(value.to_string());
        if self.secrets.get(&key).await?.is_some() {
            self.secrets.update(&key, value).await
        } else {
            self.secrets.create(&key, value).await
        }
    }

    async fn store_credentials(&self, client_id: &str, phone_id: &str, token: &str) -> Result<()> {
        self.upsert_secret(SecretKey::new(client_id, TOKEN_SECRET), token)
            .await?;
        self.upsert_secret(SecretKey::new(client_id, PHONE_ID_SECRET), phone_id)
            .await
    }
}

fn routed(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(message_metrics::ROUTED_SENDS_TOTAL, labels::KIND => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

#[async_trait]
impl<S: SecretStore + 'static> WhatsAppService for CredentialedWhatsAppService<S> {
    async fn get_client(&self, client_id: &str) -> Result<ClientInfo> {
        let client = self.client(client_id).await?;
        Ok(ClientInfo {
            client_id: client_id.to_string(),
            phone_id: client.phone_id().to_string(),
        })
    }

    async fn register_client(
        &self,
        client_id: &str,
        phone_id: &str,
        token: &str,
    ) -> Result<ClientInfo> {
        if let Err(e) = self.store_credentials(client_id, phone_id, token).await {
            warn!(client_id, error = %e, "failed to store whatsapp credentials");
            return Err(Error::registration(client_id, e));
        }

        let client = CloudApiClient::new(
            self.http.clone(),
            &self.api_base,
            phone_id,
            Secret::new(token.to_string()),
        );
        self.clients
            .write()
            .await
            .insert(client_id.to_string(), client);
        info!(client_id, phone_id, "whatsapp client registered");

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
        let id = self.client(client_id).await?.send_text(to, text).await?;
        routed("text");
        Ok(id)
    }

    async fn send_image(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String> {
        let id = self
            .client(client_id)
            .await?
            .send_image(to, url, caption)
            .await?;
        routed("image");
        Ok(id)
    }

    async fn send_video(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
    ) -> Result<String> {
        let id = self
            .client(client_id)
            .await?
            .send_video(to, url, caption)
            .await?;
        routed("video");
        Ok(id)
    }

    async fn send_document(
        &self,
        client_id: &str,
        to: &str,
        url: &str,
        caption: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String> {
        let id = self
            .client(client_id)
            .await?
            .send_document(to, url, caption, filename)
            .await?;
        routed("document");
        Ok(id)
    }

    async fn send_buttons(
        &self,
        client_id: &str,
        to: &str,
        text: &str,
        buttons: &[RoutedButton],
    ) -> Result<String> {
        let id = self
            .client(client_id)
            .await?
            .send_buttons(to, text, buttons)
            .await?;
        routed("interactive");
        Ok(id)
    }
}
