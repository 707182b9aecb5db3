//! Messaging tool entrypoints served over MCP.
//!
//! - `handlers`: the eleven tool entrypoints and [`default_registry`]
//! - `server`: JSON-RPC 2.0 dispatch (initialize, tools/list, tools/call, ping)
//! - `stdio` / `http`: transports

pub mod error;
pub mod handler;
pub mod handlers;
pub mod http;
pub mod server;
pub mod services;
pub mod stdio;
pub mod types;

pub use {
    error::{Error, Result},
    handler::{ToolHandler, ToolRegistry, ToolResponse},
    handlers::default_registry,
    http::{router, serve_http},
    server::McpServer,
    services::ToolServices,
    stdio::serve_stdio,
};
