//! Config command - View and check Syncmeter configuration
//!
//! Provides the `syncmeter config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports every error

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use syncmeter_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command against the file at `config_path`
    pub async fn execute(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(config_path, format),
            ConfigCommand::Validate => execute_validate(config_path, format),
        }
    }
}

fn execute_show(config_path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let config = Config::load_or_default(config_path);

    info!(config_path = %config_path.display(), "Showing configuration");

    if matches!(format, OutputFormat::Json) {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
    } else {
        formatter.success(&format!("Configuration ({})", config_path.display()));
        formatter.info("");
        for line in config.to_yaml()?.lines() {
            formatter.info(line);
        }
    }

    Ok(())
}

fn execute_validate(config_path: &Path, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);

    if !config_path.exists() {
        if matches!(format, OutputFormat::Json) {
            let json = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "errors": [],
                "note": "Configuration file not found. Using defaults.",
            });
            formatter.print_json(&json);
        } else {
            formatter.info(&format!(
                "Configuration file not found at {}",
                config_path.display()
            ));
            formatter.info("Using default configuration.");
        }
        return Ok(());
    }

    let config = match Config::load(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            if matches!(format, OutputFormat::Json) {
                let json = serde_json::json!({
                    "valid": false,
                    "config_path": config_path.display().to_string(),
                    "errors": [format!("{:#}", e)],
                });
                formatter.print_json(&json);
            } else {
                formatter.error(&format!("{:#}", e));
            }
            anyhow::bail!("Configuration is invalid");
        }
    };

    info!(config_path = %config_path.display(), "Validating configuration");

    let errors = config.validate();

    if matches!(format, OutputFormat::Json) {
        let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        let json = serde_json::json!({
            "valid": errors.is_empty(),
            "config_path": config_path.display().to_string(),
            "errors": error_strings,
        });
        formatter.print_json(&json);
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", config_path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", config_path.display()));
        formatter.info("");
        for error in &errors {
            formatter.info(&format!("  {} - {}", error.field, error.message));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Configuration is invalid")
    }
}
