//! Interactive button messages: quick replies and payment links.

use {
    async_trait::async_trait,
    serde_json::{Value, json},
    yatools_messages::{
        ButtonType, Footer, InteractiveData, MessageData, MessageKind, PaymentLink, Role,
    },
};

use crate::{
    context::{MessageTool, ToolContext},
    error::Result,
};

/// WhatsApp limit on quick-reply buttons per message.
pub const MAX_REPLY_BUTTONS: usize = 3;

pub struct ButtonTool {
    body_text: String,
    buttons: Vec<Value>,
    button_type: ButtonType,
    header: Option<Value>,
    footer_text: Option<String>,
    payment: Option<PaymentLink>,
}

impl ButtonTool {
    pub fn new(
        body_text: impl Into<String>,
        mut buttons: Vec<Value>,
        button_type: ButtonType,
        header: Option<Value>,
        footer_text: Option<String>,
        payment: Option<PaymentLink>,
    ) -> Self {
        if button_type == ButtonType::Reply {
            buttons.truncate(MAX_REPLY_BUTTONS);
        }
        Self {
            body_text: body_text.into(),
            buttons,
            button_type,
            header,
            footer_text,
            payment,
        }
    }

    fn footer(&self) -> &str {
        self.footer_text.as_deref().unwrap_or_default()
    }

    fn interactive_data(&self) -> InteractiveData {
        let (text, buttons) = match self.button_type {
            ButtonType::Payment => {
                let (title, url) = self
                    .payment
                    .as_ref()
                    .map(|p| (p.title.as_str(), p.url.as_str()))
                    .unwrap_or_default();
                let text = format!("{}\n{}\n{title}\n{url}", self.body_text, self.footer());
                (text, self.buttons.clone())
            },
            ButtonType::Reply => {
                let buttons = format_reply_buttons(&self.buttons);
                let text = format!(
                    "{}\n{}\nOptions: {}",
                    self.body_text,
                    self.footer(),
                    button_titles(&buttons).join(", ")
                );
                (text, buttons)
            },
        };

        InteractiveData {
            text,
            button_type: self.button_type,
            buttons,
            header: self.header.clone().filter(is_present),
            footer: self
                .footer_text
                .as_ref()
                .filter(|text| !text.is_empty())
                .map(|text| Footer { text: text.clone() }),
            payment: match self.button_type {
                ButtonType::Payment => self.payment.clone(),
                ButtonType::Reply => None,
            },
        }
    }
}

/// `{id, title}` to `{type: "reply", reply: {id, title}}`.
///
/// A missing id becomes the button's position; a missing title becomes `""`.
pub fn format_reply_buttons(buttons: &[Value]) -> Vec<Value> {
    buttons
        .iter()
        .enumerate()
        .map(|(index, button)| {
            let id = button
                .get("id")
                .cloned()
                .unwrap_or_else(|| Value::String(index.to_string()));
            let title = button
                .get("title")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            json!({ "type": "reply", "reply": { "id": id, "title": title } })
        })
        .collect()
}

/// String titles found at `title` or `reply.title`; anything else is ignored.
pub fn button_titles(buttons: &[Value]) -> Vec<&str> {
    let mut titles = Vec::new();
    for button in buttons {
        if let Some(title) = button.get("title").and_then(Value::as_str) {
            titles.push(title);
        }
        if let Some(title) = button.pointer("/reply/title").and_then(Value::as_str) {
            titles.push(title);
        }
    }
    titles
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

#[async_trait]
impl MessageTool for ButtonTool {
    /// External id of the interactive message.
    type Output = String;

    fn name(&self) -> &'static str {
        "button"
    }

    async fn execute(&self, ctx: &ToolContext) -> Result<Self::Output> {
        let data = MessageData::Interactive(self.interactive_data());
        let delivery = ctx
            .deliver_data(MessageKind::Interactive, data, Role::Assistant)
            .await?;
        Ok(delivery.external_id)
    }
}
