//! Configuration and WhatsApp client management entrypoints.

use std::sync::Arc;

use {
    async_trait::async_trait,
    serde::Deserialize,
    serde_json::{Map, Value, json},
    tracing::info,
};

use crate::{
    handler::{ToolHandler, ToolResponse, parse_args},
    services::ToolServices,
};

#[derive(Debug, Deserialize)]
struct CompanyArgs {
    company_id: String,
}

pub struct GetConfig {
    services: Arc<ToolServices>,
}

impl GetConfig {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for GetConfig {
    fn name(&self) -> &str {
        "get_config"
    }

    fn description(&self) -> &str {
        "Get the messaging configuration for a company."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["company_id"],
            "properties": {
                "company_id": {"type": "string", "description": "Company identifier"},
            }
        })
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: CompanyArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };
        tracing::debug!(company_id = %args.company_id, "serving static company config");
        ToolResponse::success()
            .with("source", "static")
            .with("config", &self.services.company_defaults)
    }
}

#[derive(Debug, Deserialize)]
struct UpdateConfigArgs {
    company_id: String,
    config: Map<String, Value>,
}

/// Acknowledges configuration updates without storing them.
#[derive(Default)]
pub struct UpdateConfig;

#[async_trait]
impl ToolHandler for UpdateConfig {
    fn name(&self) -> &str {
        "update_config"
    }

    fn description(&self) -> &str {
        "Update the messaging configuration for a company."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["company_id", "config"],
            "properties": {
                "company_id": {"type": "string", "description": "Company identifier"},
                "config": {"type": "object", "description": "New configuration"},
            }
        })
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: UpdateConfigArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };
        info!(
            company_id = %args.company_id,
            keys = args.config.len(),
            "config update acknowledged, not persisted"
        );
        ToolResponse::success().with("message", "Configuration updated")
    }
}

#[derive(Debug, Deserialize)]
struct RegisterClientArgs {
    client_id: String,
    phone_id: String,
    token: String,
}

pub struct RegisterWhatsAppClient {
    services: Arc<ToolServices>,
}

impl RegisterWhatsAppClient {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for RegisterWhatsAppClient {
    fn name(&self) -> &str {
        "register_whatsapp_client"
    }

    fn description(&self) -> &str {
        "Register (or update) a WhatsApp client's phone id and API token."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["client_id", "phone_id", "token"],
            "properties": {
                "client_id": {"type": "string", "description": "Unique client identifier"},
                "phone_id": {"type": "string", "description": "WhatsApp phone number id"},
                "token": {"type": "string", "description": "WhatsApp Cloud API token"},
            }
        })
    }

    async fn call(&self, args: Value) -> ToolResponse {
        let args: RegisterClientArgs = match parse_args(self.name(), args) {
            Ok(args) => args,
            Err(resp) => return resp,
        };
        match self
            .services
            .whatsapp
            .register_client(&args.client_id, &args.phone_id, &args.token)
            .await
        {
            Ok(info) => ToolResponse::success()
                .with("client_id", info.client_id)
                .with("message", "Client registered successfully"),
            Err(e) => ToolResponse::error(format!("Failed to register client: {e}")),
        }
    }
}

pub struct ListWhatsAppClients {
    services: Arc<ToolServices>,
}

impl ListWhatsAppClients {
    pub fn new(services: Arc<ToolServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl ToolHandler for ListWhatsAppClients {
    fn name(&self) -> &str {
        "list_whatsapp_clients"
    }

    fn description(&self) -> &str {
        "List the WhatsApp clients known to this server."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn call(&self, _args: Value) -> ToolResponse {
        match self.services.whatsapp.list_clients().await {
            Ok(clients) => ToolResponse::success().with("clients", clients),
            Err(e) => ToolResponse::error(format!("Failed to list clients: {e}")),
        }
    }
}
