//! Configuration loading and env substitution.
//!
//! Config files: `yatools.toml`, `yatools.yaml`, `yatools.yml` or `yatools.json`.
//! Searched in `./` then the user config directory.
//!
//! Supports `${ENV_VAR}` and `${ENV_VAR:-default}` substitution in the raw file.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        ENV_PORT, ENV_TRANSPORT, ENV_WHATSAPP_BACKEND, apply_env_overrides, config_dir,
        discover_and_load, find_config_file, load_config,
    },
    schema::{
        CompanyDefaults, MetricsConfig, ServerConfig, StoreBackend, StoreConfig, Transport,
        WhatsAppBackend, WhatsAppConfig, YatoolsConfig,
    },
};
