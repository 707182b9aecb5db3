use std::sync::Arc;

use {
    serde_json::{Map, Value},
    yatools_common::Recipient,
    yatools_messages::MessageStore,
    yatools_tools::{ConversationSummarizer, DefaultSummarizer, MessageSender, ToolContext},
    yatools_whatsapp::WhatsAppService,
};

const FALLBACK_COMPANY_NAME: &str = "Company";

/// Collaborators shared by every entrypoint for the life of the server.
#[derive(Clone)]
pub struct ToolServices {
    pub store: Arc<dyn MessageStore>,
    pub sender: Arc<dyn MessageSender>,
    pub whatsapp: Arc<dyn WhatsAppService>,
    pub summarizer: Arc<dyn ConversationSummarizer>,
    /// Returned verbatim by `get_config`.
    pub company_defaults: Value,
}

impl ToolServices {
    pub fn new(
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn MessageSender>,
        whatsapp: Arc<dyn WhatsAppService>,
    ) -> Self {
        Self {
            store,
            sender,
            whatsapp,
            summarizer: Arc::new(DefaultSummarizer),
            company_defaults: Value::Object(Map::new()),
        }
    }

    #[must_use]
    pub fn with_company_defaults(mut self, defaults: Value) -> Self {
        self.company_defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_summarizer(mut self, summarizer: Arc<dyn ConversationSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Display name used in alert notifications.
    pub fn company_name(&self) -> &str {
        self.company_defaults
            .get("company_name")
            .and_then(Value::as_str)
            .unwrap_or(FALLBACK_COMPANY_NAME)
    }

    pub fn context(&self, company_id: &str, phone_number: &str) -> ToolContext {
        ToolContext::new(
            Recipient::new(phone_number, company_id),
            Arc::clone(&self.store),
            Arc::clone(&self.sender),
        )
    }
}
