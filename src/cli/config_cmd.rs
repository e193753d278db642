//! Configuration management CLI commands
//!
//! Provides commands for managing ~/.gwctl/config.toml

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use super::config::CliConfig;
use super::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize configuration file with default values
    Init {
        /// Overwrite existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (token, base_url, timeout, or cache_dir)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Get configuration file path
    Path,
}

/// Handle config commands
pub fn handle_config_command(command: ConfigCommands, format: OutputFormat) -> Result<()> {
    let path = CliConfig::config_path()?;
    match command {
        ConfigCommands::Init { force } => init_config(&path, force),
        ConfigCommands::Show => show_config(&path, format),
        ConfigCommands::Set { key, value } => {
            let mut config = CliConfig::load_from_path(&path).unwrap_or_default();
            let message = set_value(&mut config, &key, &value)?;
            config.save_to_path(&path)?;
            output::success(&message);
            println!("Configuration saved to: {}", path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn init_config(path: &std::path::Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at: {}\nUse --force to overwrite",
            path.display()
        );
    }

    CliConfig::default().save_to_path(path)?;

    output::success(&format!("Configuration file created at: {}", path.display()));
    println!("\nYou can now set values using:");
    println!("  gwctl config set base_url <admin-url>");
    println!("  gwctl config set token <token>");
    println!("  gwctl config set timeout <seconds>");

    Ok(())
}

fn show_config(path: &std::path::Path, format: OutputFormat) -> Result<()> {
    if !path.exists() {
        println!("No configuration file found at: {}", path.display());
        println!("\nRun 'gwctl config init' to create one");
        return Ok(());
    }

    let config = CliConfig::load_from_path(path)?;
    output::print_with(&config, format, |config| print_config_table(config, path))
}

/// Apply one `key = value` edit, returning the confirmation message
fn set_value(config: &mut CliConfig, key: &str, value: &str) -> Result<String> {
    match key {
        "token" => {
            config.token = Some(value.to_string());
            Ok("Token set successfully".to_string())
        }
        "base_url" => {
            url::Url::parse(value).with_context(|| format!("Invalid URL: {}", value))?;
            config.base_url = Some(value.to_string());
            Ok(format!("Base URL set to: {}", value))
        }
        "timeout" => {
            let timeout: u64 =
                value.parse().context("Invalid timeout value. Must be a number in seconds")?;
            config.timeout = Some(timeout);
            Ok(format!("Timeout set to: {} seconds", timeout))
        }
        "cache_dir" => {
            config.cache_dir = Some(PathBuf::from(value));
            Ok(format!("Cache directory set to: {}", value))
        }
        _ => anyhow::bail!(
            "Unknown configuration key: '{}'. Valid keys: token, base_url, timeout, cache_dir",
            key
        ),
    }
}

fn print_config_table(config: &CliConfig, path: &std::path::Path) {
    output::print_table_header(&[("Key", 15), ("Value", 50)]);

    let token = config.token.as_ref().map(|_| "<set>").unwrap_or("<not set>");
    println!("{:<15} {}", "token", token);
    println!("{:<15} {}", "base_url", config.base_url.as_deref().unwrap_or("<not set>"));
    println!(
        "{:<15} {}",
        "timeout",
        config.timeout.map(|t| format!("{} seconds", t)).unwrap_or_else(|| "<not set>".to_string())
    );
    println!(
        "{:<15} {}",
        "cache_dir",
        config
            .cache_dir
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<not set>".to_string())
    );

    println!();
    println!("Config file: {}", path.display());
    println!();
}
