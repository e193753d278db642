//! # Command Line Interface
//!
//! `gwctl` loads the gateway configuration into a [`ConfigStore`] and runs
//! one command against it: status and statistics, validation, or an edit
//! that is written back to the gateway.

pub mod config;
pub mod config_cmd;
pub mod listeners;
pub mod output;
pub mod policies;
pub mod routes;
pub mod status;
pub mod targets;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::client::GatewayClient;
use crate::config::{ClientSettings, LogFormat};
use crate::observability::{init_logging, log_settings_info};
use crate::store::{ConfigStore, FileConfigCache};
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "gwctl")]
#[command(about = "Inspect, validate and edit gateway bind/listener/route configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bearer token for the gateway admin API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Path to file containing the bearer token
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Base URL of the gateway admin API
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory for the last-applied configuration cache
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Log format (text or json)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show connection state, source and version
    Status,

    /// Show backend, route, listener and target statistics
    Stats,

    /// Report listeners that mix HTTP and TCP routes
    Validate,

    /// Listener management commands
    Listener {
        #[command(subcommand)]
        command: listeners::ListenerCommands,
    },

    /// Route management commands
    Route {
        #[command(subcommand)]
        command: routes::RouteCommands,
    },

    /// RBAC policy commands
    Policy {
        #[command(subcommand)]
        command: policies::PolicyCommands,
    },

    /// MCP / A2A target commands
    Target {
        #[command(subcommand)]
        command: targets::TargetCommands,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        command: config_cmd::ConfigCommands,
    },
}

/// Everything a command handler needs
pub struct CommandContext {
    pub client: Arc<GatewayClient>,
    pub store: ConfigStore,
    pub format: OutputFormat,
}

/// Run CLI commands
pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let env = ClientSettings::from_env();
    init_logging(cli.verbose, cli.log_format.unwrap_or(env.log_format));

    let flags = config::SettingsFlags {
        base_url: cli.base_url,
        token: cli.token,
        token_file: cli.token_file,
        timeout: cli.timeout,
        cache_dir: cli.cache_dir,
        log_format: cli.log_format,
    };

    let command = match cli.command {
        Commands::Config { command } => {
            return config_cmd::handle_config_command(command, cli.output);
        }
        other => other,
    };

    let settings = config::resolve_settings(flags, config::CliConfig::load()?, env)?;
    log_settings_info(&settings);

    let ctx = connect(&settings, cli.output)?;
    let loaded = ctx.store.load().await;

    match command {
        Commands::Status => {
            if let Err(e) = loaded {
                warn!(error = %e, "configuration load failed");
            }
            status::show_status(&ctx)
        }
        command => {
            loaded.context("Failed to load gateway configuration")?;
            if ctx.store.is_read_only() && is_mutation(&command) {
                output::warning(
                    "Gateway configuration is externally managed; edits will be rejected",
                );
            }
            dispatch(command, &ctx).await
        }
    }
}

/// Build the client and an unloaded store
fn connect(settings: &ClientSettings, format: OutputFormat) -> Result<CommandContext> {
    let client = GatewayClient::from_settings(settings).context("Failed to create gateway client")?;
    let client = Arc::new(client);

    let mut builder = ConfigStore::builder(client.clone());
    if let Some(dir) = &settings.cache_dir {
        builder = builder.cache(Arc::new(FileConfigCache::new(dir.clone())));
    }

    Ok(CommandContext {
        client,
        store: builder.build(),
        format,
    })
}

async fn dispatch(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Status => status::show_status(ctx),
        Commands::Stats => status::show_stats(ctx),
        Commands::Validate => status::validate(ctx),
        Commands::Listener { command } => listeners::handle_listener_command(command, ctx).await,
        Commands::Route { command } => routes::handle_route_command(command, ctx).await,
        Commands::Policy { command } => policies::handle_policy_command(command, ctx).await,
        Commands::Target { command } => targets::handle_target_command(command, ctx).await,
        Commands::Config { command } => config_cmd::handle_config_command(command, ctx.format),
    }
}

fn is_mutation(command: &Commands) -> bool {
    match command {
        Commands::Listener { command } => !matches!(
            command,
            listeners::ListenerCommands::List { .. } | listeners::ListenerCommands::Get { .. }
        ),
        Commands::Route { command } => !matches!(command, routes::RouteCommands::List { .. }),
        Commands::Policy { command } => !matches!(
            command,
            policies::PolicyCommands::List | policies::PolicyCommands::Check { .. }
        ),
        Commands::Target { command } => !matches!(command, targets::TargetCommands::List { .. }),
        _ => false,
    }
}

/// Read a JSON or YAML document, chosen by file extension
pub(crate) fn read_resource<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML from {}", path.display())),
        _ => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {}", path.display())),
    }
}

/// Ask a yes/no question on stdin
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    println!("{} (y/N)", prompt);
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
