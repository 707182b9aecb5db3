use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::YatoolsConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "yatools.toml",
    "yatools.yaml",
    "yatools.yml",
    "yatools.json",
];

pub const ENV_TRANSPORT: &str = "YATOOLS_TRANSPORT";
pub const ENV_PORT: &str = "YATOOLS_PORT";
pub const ENV_WHATSAPP_BACKEND: &str = "YATOOLS_WHATSAPP_BACKEND";

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<YatoolsConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./yatools.{toml,yaml,yml,json}` (project-local)
/// 2. `<user config dir>/yatools/yatools.{toml,yaml,yml,json}`
///
/// Returns `YatoolsConfig::default()` if no config file is found or it fails to load.
pub fn discover_and_load() -> YatoolsConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    YatoolsConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    find_config_in(&dirs)
}

fn find_config_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (e.g. `~/.config/yatools/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "yatools").map(|d| d.config_dir().to_path_buf())
}

/// Apply `YATOOLS_*` environment overrides on top of a loaded config.
pub fn apply_env_overrides(config: YatoolsConfig) -> YatoolsConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: YatoolsConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> YatoolsConfig {
    if let Some(raw) = lookup(ENV_TRANSPORT) {
        match raw.parse() {
            Ok(transport) => config.server.transport = transport,
            Err(e) => warn!(var = ENV_TRANSPORT, error = %e, "ignoring env override"),
        }
    }
    if let Some(raw) = lookup(ENV_PORT) {
        match raw.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(e) => warn!(var = ENV_PORT, value = %raw, error = %e, "ignoring env override"),
        }
    }
    if let Some(raw) = lookup(ENV_WHATSAPP_BACKEND) {
        match raw.parse() {
            Ok(backend) => config.whatsapp.backend = backend,
            Err(e) => warn!(var = ENV_WHATSAPP_BACKEND, error = %e, "ignoring env override"),
        }
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<YatoolsConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
