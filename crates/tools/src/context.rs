use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::Serialize,
    serde_json::Value,
    tracing::{debug, warn},
    yatools_common::Recipient,
    yatools_messages::{Envelope, MessageData, MessageKind, MessageStore, Role, format_data},
};

#[cfg(feature = "metrics")]
use yatools_metrics::{counter, labels, messages as message_metrics};

use crate::{
    error::{Error, Result},
    sender::{MessageSender, OutboundRequest},
};

/// Everything a tool needs for one invocation.
#[derive(Clone)]
pub struct ToolContext {
    pub recipient: Recipient,
    pub store: Arc<dyn MessageStore>,
    pub sender: Arc<dyn MessageSender>,
}

/// Result of delivering a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub external_id: String,
    pub store_id: String,
}

impl ToolContext {
    pub fn new(
        recipient: Recipient,
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            recipient,
            store,
            sender,
        }
    }

    pub fn phone_number(&self) -> &str {
        &self.recipient.phone_number
    }

    pub fn company_id(&self) -> &str {
        &self.recipient.company_id
    }

    /// Normalize `content`, send it, then persist exactly one envelope.
    pub async fn deliver(&self, kind: MessageKind, content: Value, role: Role) -> Result<Delivery> {
        self.deliver_data(kind, format_data(content, kind), role).await
    }

    /// Like [`deliver`](Self::deliver) for data that is already shaped.
    pub async fn deliver_data(
        &self,
        kind: MessageKind,
        data: MessageData,
        role: Role,
    ) -> Result<Delivery> {
        let request = OutboundRequest {
            recipient: self.recipient.clone(),
            kind,
            data,
        };
        let external_id = self.sender.send(&request).await?;
        let envelope = Envelope::outbound(
            external_id.clone(),
            &self.recipient,
            kind,
            request.data,
            role,
        );
        let store_id = self.store.insert_message(&envelope).await?;

        #[cfg(feature = "metrics")]
        counter!(message_metrics::PERSISTED_TOTAL, labels::KIND => kind.as_str()).increment(1);

        debug!(kind = %kind, %external_id, %store_id, "message delivered");
        Ok(Delivery {
            external_id,
            store_id,
        })
    }
}

/// What a batch tool delivered, plus the entries it gave up on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// External ids, in input order.
    pub sent: Vec<String>,
    pub failed: Vec<ItemFailure>,
}

/// A batch entry whose send or persist failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub index: usize,
    pub error: String,
}

impl BatchOutcome {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            sent: Vec::with_capacity(capacity),
            failed: Vec::new(),
        }
    }

    /// Record the result of delivering entry `index`.
    pub(crate) fn record(&mut self, kind: MessageKind, index: usize, result: Result<Delivery>) {
        match result {
            Ok(delivery) => self.sent.push(delivery.external_id),
            Err(e) => self.failed.push(fail_item(kind, index, &e)),
        }
    }

    /// Every attempted entry failed.
    pub fn is_total_failure(&self) -> bool {
        self.sent.is_empty() && !self.failed.is_empty()
    }
}

fn fail_item(kind: MessageKind, index: usize, error: &Error) -> ItemFailure {
    warn!(kind = %kind, index, error = %error, "batch item failed, continuing");
    #[cfg(feature = "metrics")]
    counter!(message_metrics::ITEMS_FAILED_TOTAL, labels::KIND => kind.as_str()).increment(1);
    ItemFailure {
        index,
        error: error.to_string(),
    }
}

/// Log and count a batch entry that failed structural validation.
pub(crate) fn skip_item(kind: MessageKind, index: usize, reason: &str) {
    warn!(kind = %kind, index, reason, "skipping malformed item");
    #[cfg(feature = "metrics")]
    counter!(message_metrics::ITEMS_SKIPPED_TOTAL, labels::KIND => kind.as_str()).increment(1);
}

/// A tool that produces outbound messages for one recipient.
#[async_trait]
pub trait MessageTool: Send + Sync {
    type Output: Send;

    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output>;
}
