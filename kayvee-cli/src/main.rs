use std::path::Path;

use clap::Parser;

use kayvee_cli::cli::{Cli, Commands};
use kayvee_cli::commands;
use kayvee_cli::error::CliError;
use kayvee_cli::logging;
use kayvee_cli::output::OutputWriter;
use kayvee_core::config::KayveeConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(&cli.config).await?;
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
        config.validate()?;
    }

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;

    tracing::debug!(config = %cli.config.display(), "kayvee starting");

    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &config, &writer).await,
        Commands::Route(args) => commands::route::execute(args, &config, &writer).await,
    }
}

/// Load kayvee.toml when present; otherwise fall back to defaults plus env overrides.
async fn load_config(path: &Path) -> Result<KayveeConfig, CliError> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(KayveeConfig::load(path).await?);
    }

    let mut config = KayveeConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
