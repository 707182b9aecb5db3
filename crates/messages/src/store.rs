use std::sync::Arc;

use {async_trait::async_trait, tokio::sync::RwLock, tracing::debug};

use crate::{envelope::Envelope, error::Result};

/// An envelope together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: String,
    pub envelope: Envelope,
}

/// Persistence seam for outbound envelopes.
///
/// Each call persists exactly one envelope and returns its store-assigned id.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, envelope: &Envelope) -> Result<String>;
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn insert_message(&self, envelope: &Envelope) -> Result<String> {
        (**self).insert_message(envelope).await
    }
}

/// Keeps envelopes in insertion order; ids are fresh UUIDs.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<Vec<StoredMessage>>,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything stored so far, oldest first.
    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.messages.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn insert_message(&self, envelope: &Envelope) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        debug!(
            id = %id,
            kind = %envelope.kind,
            external_id = %envelope.external_id,
            "message stored"
        );
        self.messages.write().await.push(StoredMessage {
            id: id.clone(),
            envelope: envelope.clone(),
        });
        Ok(id)
    }
}

/// Records nothing and echoes the envelope's external id back.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughMessageStore;

#[async_trait]
impl MessageStore for PassthroughMessageStore {
    async fn insert_message(&self, envelope: &Envelope) -> Result<String> {
        debug!(external_id = %envelope.external_id, "message passed through");
        Ok(envelope.external_id.clone())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::envelope::{MessageData, MessageKind, Role},
        yatools_common::Recipient,
    };

    fn envelope(external_id: &str) -> Envelope {
        Envelope::outbound(
            external_id,
            &Recipient::new("555", "acme"),
            MessageKind::Text,
            MessageData::text("hi"),
            Role::Assistant,
        )
    }

    #[tokio::test]
    async fn in_memory_store_keeps_order_and_assigns_ids() {
        let store = InMemoryMessageStore::new();
        let first = store.insert_message(&envelope("a")).await.unwrap();
        let second = store.insert_message(&envelope("b")).await.unwrap();

        assert_ne!(first, second);
        let stored = store.messages().await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, first);
        assert_eq!(stored[0].envelope.external_id, "a");
        assert_eq!(stored[1].envelope.external_id, "b");
    }

    #[tokio::test]
    async fn passthrough_returns_external_id() {
        let id = PassthroughMessageStore
            .insert_message(&envelope("ext-9"))
            .await
            .unwrap();
        assert_eq!(id, "ext-9");
    }

    #[tokio::test]
    async fn arc_store_delegates() {
        let store = Arc::new(InMemoryMessageStore::new());
        let shared: Arc<dyn MessageStore> = store.clone();
        shared.insert_message(&envelope("x")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(!store.is_empty().await);
    }
}
