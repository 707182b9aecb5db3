//! Secret storage for per-client WhatsApp credentials.

use std::collections::HashMap;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tokio::sync::RwLock,
};

use crate::error::{Error, Result};

pub const TOKEN_SECRET: &str = "WHATSAPP_TOKEN";
pub const PHONE_ID_SECRET: &str = "WHATSAPP_PHONE_ID";
pub const DEFAULT_SECRET_PATH: &str = "/";

/// Address of a single secret. `environment` is the messaging client id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub environment: String,
    pub name: String,
    pub path: String,
}

impl SecretKey {
    pub fn new(environment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            name: name.into(),
            path: DEFAULT_SECRET_PATH.to_string(),
        }
    }
}

impl std::fmt::Display for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}{}", self.environment, self.path, self.name)
    }
}

/// Remote or local secret manager.
///
/// `get` returns `Ok(None)` for a missing secret; `update` on a missing
/// secret is an error.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, key: &SecretKey) -> Result<Option<Secret<String>>>;
    async fn create(&self, key: &SecretKey, value: Secret<String>) -> Result<()>;
    async fn update(&self, key: &SecretKey, value: Secret<String>) -> Result<()>;
}

/// Process-local secret store.
#[derive(Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<SecretKey, Secret<String>>>,
}

impl InMemorySecretStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a client's credentials.
    pub async fn insert_client(&self, client_id: &str, phone_id: &str, token: &str) {
        let mut secrets = self.secrets.write().await;
        secrets.insert(
            SecretKey::new(client_id, TOKEN_SECRET),
            Secret::new(token.to_string()),
        );
        secrets.insert(
            SecretKey::new(client_id, PHONE_ID_SECRET),
            Secret::new(phone_id.to_string()),
        );
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get(&self, key: &SecretKey) -> Result<Option<Secret<String>>> {
        Ok(self.secrets.read().await.get(key).cloned())
    }

    async fn create(&self, key: &SecretKey, value: Secret<String>) -> Result<()> {
        let mut secrets = self.secrets.write().await;
        if secrets.contains_key(key) {
            return Err(Error::secret(format!("secret {key} already exists")));
        }
        secrets.insert(key.clone(), value);
        Ok(())
    }

    async fn update(&self, key: &SecretKey, value: Secret<String>) -> Result<()> {
        match self.secrets.write().await.get_mut(key) {
            Some(slot) => {
                *slot = value;
                Ok(())
            },
            None => Err(Error::secret(format!("secret {key} does not exist"))),
        }
    }
}

/// Read a secret and expose it as a plain string, `None` when missing.
pub(crate) async fn read_plain<S: SecretStore + ?Sized>(
    store: &S,
    key: &SecretKey,
) -> Result<Option<String>> {
    Ok(store
        .get(key)
        .await?
        .map(|secret| secret.expose_secret().clone()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_update() {
        let store = InMemorySecretStore::new();
        let key = SecretKey::new("client-a", TOKEN_SECRET);

        assert!(store.get(&key).await.unwrap().is_none());
        store
            .create(&key, Secret::new("one".into()))
            .await
            .unwrap();
        store
            .update(&key, Secret::new("two".into()))
            .await
            .unwrap();

        let value = read_plain(&store, &key).await.unwrap();
        assert_eq!(value.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn update_missing_secret_fails() {
        let store = InMemorySecretStore::new();
        let err = store
            .update(&SecretKey::new("x", TOKEN_SECRET), Secret::new("v".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Secret { .. }));
    }

    #[tokio::test]
    async fn create_existing_secret_fails() {
        let store = InMemorySecretStore::new();
        store.insert_client("c", "phone", "tok").await;
        let err = store
            .create(&SecretKey::new("c", PHONE_ID_SECRET), Secret::new("p".into()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn secret_key_display_includes_environment_and_path() {
        let key = SecretKey::new("acme", TOKEN_SECRET);
        assert_eq!(key.to_string(), "acme:/WHATSAPP_TOKEN");
    }
}
