//! The entrypoints exposed over MCP.

pub mod admin;
pub mod alert;
pub mod messaging;

use std::sync::Arc;

use crate::{handler::ToolRegistry, services::ToolServices};

pub use {
    admin::{GetConfig, ListWhatsAppClients, RegisterWhatsAppClient, UpdateConfig},
    alert::{SendAlert, Sleep},
    messaging::{SendButton, SendDocument, SendImage, SendText, SendVideo},
};

/// Registry with every entrypoint wired to `services`.
pub fn default_registry(services: Arc<ToolServices>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SendText::new(Arc::clone(&services))));
    registry.register(Arc::new(SendImage::new(Arc::clone(&services))));
    registry.register(Arc::new(SendVideo::new(Arc::clone(&services))));
    registry.register(Arc::new(SendDocument::new(Arc::clone(&services))));
    registry.register(Arc::new(SendButton::new(Arc::clone(&services))));
    registry.register(Arc::new(SendAlert::new(Arc::clone(&services))));
    registry.register(Arc::new(Sleep::new(Arc::clone(&services))));
    registry.register(Arc::new(GetConfig::new(Arc::clone(&services))));
    registry.register(Arc::new(UpdateConfig));
    registry.register(Arc::new(RegisterWhatsAppClient::new(Arc::clone(&services))));
    registry.register(Arc::new(ListWhatsAppClients::new(services)));
    registry
}
