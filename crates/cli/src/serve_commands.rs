use std::{net::SocketAddr, sync::Arc};

use {
    anyhow::Context,
    axum::{Router, routing::get},
    tracing::info,
    yatools_config::{StoreBackend, Transport, WhatsAppBackend, YatoolsConfig},
    yatools_mcp::{McpServer, ToolRegistry, ToolServices, default_registry},
    yatools_messages::{InMemoryMessageStore, MessageStore, PassthroughMessageStore},
    yatools_metrics::MetricsHandle,
    yatools_tools::PlaceholderSender,
    yatools_whatsapp::{
        CredentialedWhatsAppService, InMemorySecretStore, MockWhatsAppService, WhatsAppService,
    },
};

/// Wire the collaborators selected by `config`.
pub fn build_services(config: &YatoolsConfig) -> anyhow::Result<ToolServices> {
    let store: Arc<dyn MessageStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(InMemoryMessageStore::new()),
        StoreBackend::Passthrough => Arc::new(PassthroughMessageStore),
    };
    let whatsapp: Arc<dyn WhatsAppService> = match config.whatsapp.backend {
        WhatsAppBackend::Mock => Arc::new(MockWhatsAppService::new()),
        WhatsAppBackend::Cloud => Arc::new(CredentialedWhatsAppService::with_api_base(
            Arc::new(InMemorySecretStore::new()),
            &config.whatsapp.api_base,
        )),
    };
    info!(
        store = ?config.store.backend,
        whatsapp = ?config.whatsapp.backend,
        "collaborators wired"
    );

    let company_defaults = serde_json::to_value(&config.company_defaults)
        .context("failed to encode company defaults")?;
    Ok(ToolServices::new(store, Arc::new(PlaceholderSender), whatsapp)
        .with_company_defaults(company_defaults))
}

pub fn build_registry(config: &YatoolsConfig) -> anyhow::Result<ToolRegistry> {
    Ok(default_registry(Arc::new(build_services(config)?)))
}

pub async fn serve(config: YatoolsConfig, metrics: MetricsHandle) -> anyhow::Result<()> {
    let registry = build_registry(&config)?;
    info!(tools = registry.len(), transport = ?config.server.transport, "starting MCP server");
    let server = Arc::new(McpServer::new(config.server.name.clone(), registry));

    match config.server.transport {
        Transport::Stdio => yatools_mcp::serve_stdio(&server).await?,
        Transport::Http => {
            let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port)
                .parse()
                .with_context(|| {
                    format!(
                        "invalid bind address {}:{}",
                        config.server.bind, config.server.port
                    )
                })?;
            let mut app = yatools_mcp::router(server);
            if config.metrics.enabled && config.metrics.prometheus_endpoint {
                app = app.merge(metrics_router(metrics));
            }
            yatools_mcp::serve_http(app, addr).await?;
        },
    }
    Ok(())
}

fn metrics_router(metrics: MetricsHandle) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let metrics = metrics.clone();
            async move { metrics.render() }
        }),
    )
}
