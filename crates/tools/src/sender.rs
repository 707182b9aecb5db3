//! The per-company gateway seam used by every delivery tool.

use {
    async_trait::async_trait,
    tracing::debug,
    yatools_common::{Recipient, new_external_id},
    yatools_messages::{MessageData, MessageKind},
};

use crate::error::Result;

/// One outbound item, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub recipient: Recipient,
    pub kind: MessageKind,
    pub data: MessageData,
}

/// Delivers an outbound item and returns the provider's external id.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<String>;
}

/// Sender that only mints external ids. Nothing leaves the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderSender;

#[async_trait]
impl MessageSender for PlaceholderSender {
    async fn send(&self, request: &OutboundRequest) -> Result<String> {
        let external_id = new_external_id();
        debug!(
            kind = %request.kind,
            phone_number = %request.recipient.phone_number,
            company_id = %request.recipient.company_id,
            %external_id,
            "placeholder send"
        );
        Ok(external_id)
    }
}
