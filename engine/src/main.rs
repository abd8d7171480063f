// Relay
// Main entry point for the relay binary

use clap::Parser;
use relay_engine::cli::{Cli, Command};
use relay_engine::config::Config;
use relay_engine::handlers::{handle_route, handle_serve, handle_status, OutputFormat};
use relay_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log beats the config file; RUST_LOG beats both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    tracing::info!(
        "Relay v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Serve { bind } => handle_serve(&config, bind).await,
        Command::Status => handle_status(&config, format).await,
        Command::Route { message, provider } => {
            handle_route(&message, provider.as_deref(), format)
        }
    }
}
