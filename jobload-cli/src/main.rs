use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use jobload_config::domains::logging::LogLevel;
use jobload_config::{ConfigLoader, JobloadConfig};
use jobload_logging::{init_logging_from_config, init_simple_tracing};
use std::path::Path;
use tracing::{debug, info};

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{handle_config_generate, handle_config_validate};
use commands::run::handle_run;
use commands::summarize::handle_summarize;

/// Load configuration from file or environment, applying `JOBLOAD_*`
/// overrides. Validation waits until the command-line overrides are in.
fn load_config(config_path: Option<&Path>) -> Result<JobloadConfig> {
    let loader = ConfigLoader::new();
    match config_path {
        Some(path) => loader
            .read_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => loader
            .read_env()
            .context("Failed to load configuration from environment"),
    }
}

/// Initialize logging from configuration, with the CLI level taking precedence
fn init_logging_with_config(config: &JobloadConfig, log_level: Option<&str>) -> Result<()> {
    let mut logging = config.logging.clone();
    if let Some(level) = log_level {
        logging.level = level
            .parse::<LogLevel>()
            .map_err(anyhow::Error::msg)
            .context("Invalid --log-level")?;
    }
    init_logging_from_config(&logging)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run(args)) => {
            let config = load_config(cli.config.as_deref())?;
            init_logging_with_config(&config, cli.log_level.as_deref())?;
            info!("Jobload starting");
            debug!(?config, "Effective configuration before overrides");
            handle_run(config, args).await
        }
        Some(Commands::Config { config_cmd }) => {
            init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
            match config_cmd {
                ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
                ConfigCommands::Generate { output, force } => {
                    handle_config_generate(output.as_deref(), *force)
                }
            }
        }
        Some(Commands::Summarize { path, format }) => {
            init_simple_tracing(cli.log_level.as_deref().unwrap_or("warn"))?;
            handle_summarize(path, *format)
        }
        None => {
            // If no subcommand is provided, print help
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
