use {
    async_trait::async_trait,
    serde_json::Value,
    tracing::debug,
    yatools_messages::{MessageKind, Role},
};

use crate::{
    context::{MessageTool, ToolContext},
    error::Result,
};

/// Sends one text message.
pub struct TextTool {
    message: String,
}

impl TextTool {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl MessageTool for TextTool {
    /// The store-assigned id, or `None` when there was nothing to send.
    type Output = Option<String>;

    fn name(&self) -> &'static str {
        "text"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        if self.message.is_empty() {
            debug!(phone_number = ctx.phone_number(), "empty text message, nothing sent");
            return Ok(None);
        }
        let delivery = ctx
            .deliver(
                MessageKind::Text,
                Value::String(self.message.clone()),
                Role::Assistant,
            )
            .await?;
        Ok(Some(delivery.store_id))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{COMPANY, FailingSender, FailingStore, Harness, PHONE, context_with},
        std::sync::Arc,
        yatools_messages::InMemoryMessageStore,
    };

    #[tokio::test]
    async fn returns_store_id_and_persists_one_text_envelope() {
        let h = Harness::new();
        let id = TextTool::new("Hola!").execute(&h.ctx).await.unwrap();

        let stored = h.store.messages().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(id.as_deref(), Some(stored[0].id.as_str()));

        let env = &stored[0].envelope;
        assert_eq!(env.kind, MessageKind::Text);
        assert_eq!(env.role, Role::Assistant);
        assert_eq!(env.data.as_text(), Some("Hola!"));
        assert_eq!(env.external_id, "ext-1");
        assert_eq!(env.client.phone_number, PHONE);
        assert_eq!(env.commerce.id, COMPANY);
    }

    #[tokio::test]
    async fn empty_message_sends_and_persists_nothing() {
        let h = Harness::new();
        let id = TextTool::new("").execute(&h.ctx).await.unwrap();

        assert_eq!(id, None);
        assert!(h.store.is_empty().await);
        assert!(h.sender.requests().is_empty());
    }

    #[tokio::test]
    async fn send_failure_persists_nothing() {
        let store = Arc::new(InMemoryMessageStore::new());
        let ctx = context_with(store.clone(), Arc::new(FailingSender));
        let err = TextTool::new("hi").execute(&ctx).await.unwrap_err();

        assert!(err.to_string().contains("gateway unavailable"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let h = Harness::new();
        let ctx = context_with(Arc::new(FailingStore), h.sender.clone());
        let err = TextTool::new("hi").execute(&ctx).await.unwrap_err();
        assert!(matches!(err, crate::Error::Store(_)));
    }
}
