/// Config schema types (server, whatsapp, store, metrics, company defaults).
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_NAME: &str = "YaVendió Tools";
pub const DEFAULT_WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YatoolsConfig {
    pub server: ServerConfig,
    pub whatsapp: WhatsAppConfig,
    pub store: StoreConfig,
    pub metrics: MetricsConfig,
    pub company_defaults: CompanyDefaults,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    Stdio,
    Http,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown transport '{other}' (expected stdio or http)")),
        }
    }
}

/// MCP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Reported to MCP clients in `initialize`.
    pub name: String,
    pub transport: Transport,
    /// Address to bind to for the HTTP transport. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.into(),
            transport: Transport::Stdio,
            bind: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhatsAppBackend {
    /// In-memory clients; sends are recorded, nothing leaves the process.
    #[default]
    Mock,
    /// Graph API with credentials held in the secret store.
    Cloud,
}

impl std::str::FromStr for WhatsAppBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "cloud" => Ok(Self::Cloud),
            other => Err(format!("unknown whatsapp backend '{other}' (expected mock or cloud)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhatsAppConfig {
    pub backend: WhatsAppBackend,
    pub api_base: String,
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            backend: WhatsAppBackend::Mock,
            api_base: DEFAULT_WHATSAPP_API_BASE.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Keep envelopes in process memory.
    #[default]
    Memory,
    /// Persist nothing; inserts echo the envelope's external id.
    Passthrough,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

/// Metrics and observability configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Whether metrics collection is enabled.
    pub enabled: bool,
    /// Whether the HTTP transport exposes `/metrics`.
    pub prometheus_endpoint: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prometheus_endpoint: true,
        }
    }
}

/// Static per-company settings returned by `get_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDefaults {
    pub welcome_message: String,
    pub auto_reply: bool,
    pub notification_emails: Vec<String>,
    /// Name used in alert notifications.
    pub company_name: String,
}

impl Default for CompanyDefaults {
    fn default() -> Self {
        Self {
            welcome_message: "Hello, welcome to our service!".into(),
            auto_reply: true,
            notification_emails: vec!["admin@example.com".into()],
            company_name: "Company".into(),
        }
    }
}
