//! WhatsApp messaging clients for yatools.
//!
//! A [`WhatsAppService`] maps a messaging client id to credentials and routes
//! sends through it. [`CredentialedWhatsAppService`] resolves credentials from
//! a [`SecretStore`] and talks to the Cloud API; [`MockWhatsAppService`] keeps
//! everything in memory.

pub mod cloud;
pub mod credentialed;
pub mod error;
pub mod mock;
pub mod secrets;
pub mod service;

pub use {
    cloud::{CloudApiClient, DEFAULT_API_BASE},
    credentialed::CredentialedWhatsAppService,
    error::{Error, Result},
    mock::{MockWhatsAppService, RecordedSend},
    secrets::{InMemorySecretStore, SecretKey, SecretStore},
    service::{ClientInfo, RoutedButton, WhatsAppService},
};
