//! HTTP transport: JSON-RPC over `POST /mcp`.

use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Json, Router,
        extract::State,
        http::{StatusCode, header},
        response::{IntoResponse, Response},
        routing::{get, post},
    },
    serde_json::{Value, json},
    tracing::info,
};

use crate::{
    Result,
    error::Context,
    server::McpServer,
    types::{JsonRpcResponse, PARSE_ERROR},
};

pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_handler))
        .route("/health", get(health_handler))
        .with_state(server)
}

/// Malformed or empty bodies get a JSON-RPC parse error with a null id.
async fn mcp_handler(State(server): State<Arc<McpServer>>, body: String) -> Response {
    if body.trim().is_empty() {
        let response = JsonRpcResponse::failure(Value::Null, PARSE_ERROR, "Parse error: empty body");
        return (StatusCode::OK, Json(response)).into_response();
    }
    match server.handle_line(&body).await {
        Some(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            text,
        )
            .into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

async fn health_handler(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "server": server.name(),
        "tools": server.registry().len(),
    }))
}

/// Bind `addr` and serve `app` until the process is stopped.
pub async fn serve_http(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "MCP server listening on http");
    axum::serve(listener, app).await?;
    Ok(())
}
