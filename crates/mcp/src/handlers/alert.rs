use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::Deserialize,
    serde_json::{Value, json},
    yatools_tools::{AlertTool, EmailAlert, MessageTool, SleepTool, SmsAlert},
};

use crate::{
    handler::{ToolHandler, ToolResponse, parse_args},
    services::ToolServices,
};

#[derive(Debug, Deserialize)]
struct SendAlertArgs {
    company_id: String,
    phone_number: String,
    message: String,
    #[serde(default)]
    whatsapp: bool,
    #[serde(default)]
    email: Option<EmailAlert>,
    #[serde(default)]
    sms: Option<SmsAlert>,
    #[serde(default)]
    pause_number: bool,
    #[serde(default)]
    track_sale: bool,
}

pub struct SendAlert {
    services: Arc<ToolServices>,
}

impl SendAlert {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for SendAlert {
    fn name(&self) -> &str {
        "send_alert"
    }

    fn description(&self) -> &str {
        "Raise an alert about a conversation across WhatsApp, email, SMS, sale tracking and pausing. \
         The message may contain {phone_number} and {summary_response} placeholders."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["company_id", "phone_number", "message"],
            "properties": {
                "company_id": {"type": "string", "description": "Company identifier"},
                "phone_number": {"type": "string", "description": "Phone number the alert is about"},
                "message": {"type": "string", "description": "Alert message template"},
                "whatsapp": {"type": "boolean", "default": false},
                "email": {
                    "type": "object",
                    "description": "Email settings {subject}",
                    "properties": {"subject": {"type": "string"}},
                },
                "sms": {
                    "type": "object",
                    "description": "SMS settings {type, recipients}",
                    "properties": {
                        "type": {"type": "string", "enum": ["venta", "derivación"]},
                        "recipients": {"type": "array", "items": {"type": "string"}},
                    },
                },
                "pause_number": {"type": "boolean", "default": false},
                "track_sale": {"type": "boolean", "default": false},
            }
        })
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: SendAlertArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };

        let tool = AlertTool::new(args.message)
            .whatsapp(args.whatsapp)
            .email(args.email)
            .sms(args.sms)
            .pause_number(args.pause_number)
            .track_sale(args.track_sale)
            .company_name(self.services.company_name())
            .summarizer(Arc::clone(&self.services.summarizer));
        let ctx = self.services.context(&args.company_id, &args.phone_number);
        match tool.execute(&ctx).await {
            Ok(report) => ToolResponse::success().with("result", report),
            Err(e) => ToolResponse::error(format!("Failed to send alert: {e}")),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SleepArgs {
    company_id: String,
    phone_number: String,
    seconds: i64,
}

pub struct Sleep {
    services: Arc<ToolServices>,
}

impl Sleep {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for Sleep {
    fn name(&self) -> &str {
        "sleep"
    }

    fn description(&self) -> &str {
        "Pause for a number of seconds before the next action. Negative values do nothing."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["company_id", "phone_number", "seconds"],
            "properties": {
                "company_id": {"type": "string", "description": "Company identifier"},
                "phone_number": {"type": "string", "description": "Recipient's phone number"},
                "seconds": {"type": "integer", "description": "Seconds to wait"},
            }
        })
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: SleepArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };
        let ctx = self.services.context(&args.company_id, &args.phone_number);
        match SleepTool::new(args.seconds).execute(&ctx).await {
            Ok(()) => ToolResponse::success().with("seconds", args.seconds),
            Err(e) => ToolResponse::error(format!("Failed to sleep: {e}")),
        }
    }
}
