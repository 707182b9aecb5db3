//! Multi-channel alert dispatch.
//!
//! Channels run in a fixed order and only when requested. Each requested
//! channel leaves exactly one entry in the [`AlertReport`]; a failing
//! messaging channel is recorded as `false` and does not stop the others.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize, Serializer, ser::SerializeMap},
    serde_json::{Map, Value},
    tracing::{debug, warn},
    yatools_common::Recipient,
    yatools_messages::{MessageKind, Role},
};

#[cfg(feature = "metrics")]
use yatools_metrics::{alerts as alert_metrics, counter, labels};

use crate::{
    context::{MessageTool, ToolContext},
    error::Result,
};

const PHONE_PLACEHOLDER: &str = "{phone_number}";
const SUMMARY_PLACEHOLDER: &str = "{summary_response}";
const DEFAULT_EMAIL_SUBJECT: &str = "Alert";
const DEFAULT_COMPANY_NAME: &str = "Company";
const SALE_SMS_KIND: &str = "venta";

/// Alert channels, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertChannel {
    SaleTracked,
    WhatsApp,
    Email,
    Sms,
    Paused,
}

impl AlertChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleTracked => "sale_tracked",
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
            Self::Sms => "sms",
            Self::Paused => "paused",
        }
    }
}

/// Per-channel result: a success flag or the id of the message sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AlertOutcome {
    Flag(bool),
    MessageId(String),
}

impl AlertOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Flag(ok) => *ok,
            Self::MessageId(_) => true,
        }
    }
}

/// Ordered channel → outcome map. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertReport {
    entries: Vec<(AlertChannel, AlertOutcome)>,
}

impl AlertReport {
    pub fn get(&self, channel: AlertChannel) -> Option<&AlertOutcome> {
        self.entries
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, outcome)| outcome)
    }

    pub fn channels(&self) -> impl Iterator<Item = AlertChannel> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn record(&mut self, channel: AlertChannel, outcome: AlertOutcome) {
        #[cfg(feature = "metrics")]
        counter!(
            alert_metrics::CHANNELS_TOTAL,
            labels::CHANNEL => channel.as_str(),
            labels::OUTCOME => if outcome.is_success() { "ok" } else { "failed" }
        )
        .increment(1);
        self.entries.push((channel, outcome));
    }
}

impl Serialize for AlertReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (channel, outcome) in &self.entries {
            map.serialize_entry(channel.as_str(), outcome)?;
        }
        map.end()
    }
}

/// Email channel settings. An empty mapping means "not requested".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailAlert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmailAlert {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.extra.is_empty()
    }

    /// Subject with the recipient's phone number substituted.
    pub fn render_subject(&self, phone_number: &str) -> String {
        self.subject
            .as_deref()
            .unwrap_or(DEFAULT_EMAIL_SUBJECT)
            .replace(PHONE_PLACEHOLDER, phone_number)
    }
}

/// SMS / push channel settings. An empty mapping means "not requested".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmsAlert {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipients: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SmsAlert {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.recipients.is_empty() && self.extra.is_empty()
    }
}

/// Push-notification text for an SMS alert. Unknown kinds get the
/// help-needed text.
pub fn push_notification_message(kind: Option<&str>, company_name: &str, phone_number: &str) -> String {
    match kind {
        Some(SALE_SMS_KIND) => {
            format!("'{company_name}': 🤑 Ya! vendiste! Venta confirmada de '{phone_number}'")
        },
        _ => format!("'{company_name}': '{phone_number}' necesita tu ayuda 🆘"),
    }
}

/// Produces the text substituted for `{summary_response}`.
#[async_trait]
pub trait ConversationSummarizer: Send + Sync {
    async fn summarize(&self, recipient: &Recipient) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSummarizer;

#[async_trait]
impl ConversationSummarizer for DefaultSummarizer {
    async fn summarize(&self, recipient: &Recipient) -> Result<String> {
        Ok(format!("Conversation with {}", recipient.phone_number))
    }
}

pub struct AlertTool {
    message: String,
    whatsapp: bool,
    email: Option<EmailAlert>,
    sms: Option<SmsAlert>,
    pause_number: bool,
    track_sale: bool,
    company_name: String,
    summarizer: Arc<dyn ConversationSummarizer>,
}

impl AlertTool {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            whatsapp: false,
            email: None,
            sms: None,
            pause_number: false,
            track_sale: false,
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            summarizer: Arc::new(DefaultSummarizer),
        }
    }

    #[must_use]
    pub fn whatsapp(mut self, enabled: bool) -> Self {
        self.whatsapp = enabled;
        self
    }

    #[must_use]
    pub fn email(mut self, email: Option<EmailAlert>) -> Self {
        self.email = email.filter(|e| !e.is_empty());
        self
    }

    #[must_use]
    pub fn sms(mut self, sms: Option<SmsAlert>) -> Self {
        self.sms = sms.filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn pause_number(mut self, enabled: bool) -> Self {
        self.pause_number = enabled;
        self
    }

    #[must_use]
    pub fn track_sale(mut self, enabled: bool) -> Self {
        self.track_sale = enabled;
        self
    }

    #[must_use]
    pub fn company_name(mut self, name: impl Into<String>) -> Self {
        self.company_name = name.into();
        self
    }

    #[must_use]
    pub fn summarizer(mut self, summarizer: Arc<dyn ConversationSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    /// Substitute placeholders. Any failure yields the raw template.
    async fn format_message(&self, recipient: &Recipient) -> String {
        let mut message = self.message.clone();
        if message.contains(SUMMARY_PLACEHOLDER) {
            match self.summarizer.summarize(recipient).await {
                Ok(summary) => message = message.replace(SUMMARY_PLACEHOLDER, &summary),
                Err(e) => {
                    warn!(error = %e, "conversation summary failed, sending raw alert template");
                    return self.message.clone();
                },
            }
        }
        message.replace(PHONE_PLACEHOLDER, &recipient.phone_number)
    }

    async fn send_whatsapp(&self, ctx: &ToolContext, message: &str) -> AlertOutcome {
        match ctx
            .deliver(MessageKind::Text, Value::String(message.to_string()), Role::Alert)
            .await
        {
            Ok(delivery) => AlertOutcome::MessageId(delivery.external_id),
            Err(e) => {
                warn!(
                    phone_number = ctx.phone_number(),
                    error = %e,
                    "whatsapp alert failed"
                );
                AlertOutcome::Flag(false)
            },
        }
    }
}

#[async_trait]
impl MessageTool for AlertTool {
    type Output = AlertReport;

    fn name(&self) -> &'static str {
        "alert"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        let message = self.format_message(&ctx.recipient).await;
        let mut report = AlertReport::default();

        if self.track_sale {
            debug!(phone_number = ctx.phone_number(), "sale tracked");
            report.record(AlertChannel::SaleTracked, AlertOutcome::Flag(true));
        }

        if self.whatsapp {
            let outcome = self.send_whatsapp(ctx, &message).await;
            report.record(AlertChannel::WhatsApp, outcome);
        }

        if let Some(email) = &self.email {
            let subject = email.render_subject(ctx.phone_number());
            debug!(%subject, "email alert accepted");
            report.record(AlertChannel::Email, AlertOutcome::Flag(true));
        }

        if let Some(sms) = &self.sms {
            let text = push_notification_message(
                sms.kind.as_deref(),
                &self.company_name,
                ctx.phone_number(),
            );
            debug!(%text, recipients = sms.recipients.len(), "sms alert accepted");
            report.record(AlertChannel::Sms, AlertOutcome::Flag(true));
        }

        if self.pause_number {
            debug!(phone_number = ctx.phone_number(), "conversation paused");
            report.record(AlertChannel::Paused, AlertOutcome::Flag(true));
        }

        Ok(report)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            Error,
            testing::{FailingSender, Harness, PHONE, context_with},
        },
        serde_json::json,
        yatools_messages::InMemoryMessageStore,
    };

    struct BrokenSummarizer;

    #[async_trait]
    impl ConversationSummarizer for BrokenSummarizer {
        async fn summarize(&self, _recipient: &Recipient) -> Result<String> {
            Err(Error::message("summary backend offline"))
        }
    }

    #[tokio::test]
    async fn nothing_requested_yields_empty_report() {
        let h = Harness::new();
        let report = AlertTool::new("hi").execute(&h.ctx).await.unwrap();
        assert!(report.is_empty());
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn channels_run_in_fixed_order() {
        let h = Harness::new();
        let report = AlertTool::new("hi")
            .pause_number(true)
            .sms(Some(SmsAlert {
                kind: Some("venta".into()),
                ..Default::default()
            }))
            .email(Some(EmailAlert {
                subject: Some("Lead".into()),
                ..Default::default()
            }))
            .whatsapp(true)
            .track_sale(true)
            .execute(&h.ctx)
            .await
            .unwrap();

        let order: Vec<_> = report.channels().collect();
        assert_eq!(order, vec![
            AlertChannel::SaleTracked,
            AlertChannel::WhatsApp,
            AlertChannel::Email,
            AlertChannel::Sms,
            AlertChannel::Paused,
        ]);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "sale_tracked": true,
                "whatsapp": "ext-1",
                "email": true,
                "sms": true,
                "paused": true,
            })
        );
    }

    #[tokio::test]
    async fn whatsapp_alert_persists_formatted_text_with_alert_role() {
        let h = Harness::new();
        let report = AlertTool::new("Call {phone_number}: {summary_response}")
            .whatsapp(true)
            .execute(&h.ctx)
            .await
            .unwrap();

        let envs = h.envelopes().await;
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].role, Role::Alert);
        assert_eq!(envs[0].kind, MessageKind::Text);
        assert_eq!(
            envs[0].data.as_text().unwrap(),
            format!("Call {PHONE}: Conversation with {PHONE}")
        );
        assert_eq!(
            report.get(AlertChannel::WhatsApp),
            Some(&AlertOutcome::MessageId(envs[0].external_id.clone()))
        );
        assert_eq!(report.len(), 1);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"whatsapp": envs[0].external_id})
        );
    }

    #[tokio::test]
    async fn whatsapp_failure_is_recorded_and_later_channels_still_run() {
        let store = Arc::new(InMemoryMessageStore::new());
        let ctx = context_with(store.clone(), Arc::new(FailingSender));
        let report = AlertTool::new("x")
            .whatsapp(true)
            .pause_number(true)
            .execute(&ctx)
            .await
            .unwrap();

        assert_eq!(report.get(AlertChannel::WhatsApp), Some(&AlertOutcome::Flag(false)));
        assert_eq!(report.get(AlertChannel::Paused), Some(&AlertOutcome::Flag(true)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn empty_email_and_sms_mappings_are_not_requested() {
        let h = Harness::new();
        let report = AlertTool::new("x")
            .email(Some(EmailAlert::default()))
            .sms(Some(SmsAlert::default()))
            .execute(&h.ctx)
            .await
            .unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn summarizer_failure_falls_back_to_raw_template() {
        let h = Harness::new();
        AlertTool::new("{phone_number} -> {summary_response}")
            .whatsapp(true)
            .summarizer(Arc::new(BrokenSummarizer))
            .execute(&h.ctx)
            .await
            .unwrap();

        let envs = h.envelopes().await;
        assert_eq!(
            envs[0].data.as_text(),
            Some("{phone_number} -> {summary_response}")
        );
    }

    #[test]
    fn email_subject_defaults_and_substitutes() {
        assert_eq!(EmailAlert::default().render_subject("1"), "Alert");
        let email = EmailAlert {
            subject: Some("Lead {phone_number}".into()),
            ..Default::default()
        };
        assert_eq!(email.render_subject("555"), "Lead 555");
    }

    #[test]
    fn push_notification_texts() {
        assert_eq!(
            push_notification_message(Some("venta"), "Shop", "555"),
            "'Shop': 🤑 Ya! vendiste! Venta confirmada de '555'"
        );
        assert_eq!(
            push_notification_message(Some("other"), "Shop", "555"),
            "'Shop': '555' necesita tu ayuda 🆘"
        );
        assert_eq!(
            push_notification_message(None, "Shop", "555"),
            push_notification_message(Some("derivación"), "Shop", "555")
        );
    }

    #[test]
    fn sms_config_decodes_type_key() {
        let sms: SmsAlert = serde_json::from_value(json!({"type": "venta"})).unwrap();
        assert_eq!(sms.kind.as_deref(), Some("venta"));
        assert!(!sms.is_empty());
    }
}
