//! Syncmeter CLI - Command-line interface for the Syncmeter progress engine
//!
//! Provides commands for:
//! - Replaying recorded sync-engine events through the estimator
//! - Viewing and validating configuration

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use syncmeter_core::config::{Config, LoggingConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, replay::ReplayCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "syncmeter",
    version,
    about = "Progress and ETA estimation for file synchronization runs"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a script of sync events and show the resulting progress
    Replay(ReplayCommand),
    /// View and validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins over `-v`, which wins over the configured level. Logs go
/// to stderr so JSON output on stdout stays parseable.
fn init_tracing(verbose: u8, logging: &LoggingConfig) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Resolves and loads the configuration file
///
/// A file named with `--config` must exist and parse, except for
/// `config validate`, which reports those problems itself. The default
/// location falls back to defaults.
fn load_config(explicit: Option<&Path>, command: &Commands) -> Result<(PathBuf, Config)> {
    let Some(path) = explicit else {
        let path = Config::default_path();
        let config = Config::load_or_default(&path);
        return Ok((path, config));
    };

    if matches!(command, Commands::Config(ConfigCommand::Validate)) {
        return Ok((path.to_path_buf(), Config::load_or_default(path)));
    }

    let config = Config::load(path)?;
    Ok((path.to_path_buf(), config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config_path, config) = load_config(cli.config.as_deref(), &cli.command)?;

    init_tracing(cli.verbose, &config.logging);
    debug!(config_path = %config_path.display(), "Loaded configuration");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Replay(cmd) => cmd.execute(&config.progress, format).await,
        Commands::Config(cmd) => cmd.execute(&config_path, format).await,
    }
}
