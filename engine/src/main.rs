// Crop Advisor
// Main entry point for the crop-advisor binary

use advisor_engine::cli::{Cli, Command};
use advisor_engine::config::Config;
use advisor_engine::handlers::{
    handle_ask, handle_context, handle_doctor, handle_serve, handle_setup, OutputFormat,
};
use advisor_engine::telemetry::init_telemetry_with_level;
use clap::Parser;
use sdk::types::AdvisoryRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Start logging before the config is read so first-run messages are kept
    let telemetry = init_telemetry_with_level(cli.log.as_deref().unwrap_or("info"));

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Crop Advisor v{} ({} - {})", version, commit, timestamp);

    // Load configuration (or use custom path if provided)
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config = if cli.config.is_some() {
        Config::load_from_path(&config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over config; RUST_LOG wins over both
    if cli.log.is_none() {
        telemetry.set_level(&config.core.log_level);
    }

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Handle commands
    match cli.command {
        Command::Serve { host, port } => {
            tracing::info!("Starting web form...");
            handle_serve(&config, host, port, format).await
        }

        Command::Ask {
            question,
            region,
            temperature,
            climate,
        } => {
            let request = AdvisoryRequest::new(question)
                .with_region(region)
                .with_temperature(temperature)
                .with_climate(climate);
            handle_ask(request, &config, format).await
        }

        Command::Context { text, raw } => handle_context(text, raw, &config, format).await,

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, Some(&config_path), format).await
        }

        Command::Setup => {
            tracing::info!("Running setup...");
            handle_setup(&config).await
        }
    }
}
