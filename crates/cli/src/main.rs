mod serve_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    yatools_config::YatoolsConfig,
};

#[derive(Parser)]
#[command(name = "yatools", about = "YaVendió messaging tools over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: search ./ then the user config dir).
    #[arg(long, global = true, env = "YATOOLS_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server (default when no subcommand is provided).
    Serve,
    /// List the registered tools.
    Tools,
}

/// Logs always go to stderr; stdout carries the stdio transport.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<YatoolsConfig> {
    let config = match &cli.config {
        Some(path) => yatools_config::load_config(path)?,
        None => yatools_config::discover_and_load(),
    };
    Ok(yatools_config::apply_env_overrides(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "yatools starting");
    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Serve) => {
            let metrics = yatools_metrics::init_metrics(config.metrics.enabled)?;
            serve_commands::serve(config, metrics).await
        },
        Some(Commands::Tools) => {
            let registry = serve_commands::build_registry(&config)?;
            for def in registry.definitions() {
                println!("{:<26} {}", def.name, def.description.unwrap_or_default());
            }
            Ok(())
        },
    }
}
