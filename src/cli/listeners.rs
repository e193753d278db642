//! Listener CLI commands
//!
//! Provides command-line interface for inspecting and editing listeners

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

use super::output::{self, print_with, truncate};
use super::{confirm, read_resource, CommandContext};
use crate::client::GatewayApi;
use crate::domain::{Bind, Listener};

#[derive(Subcommand)]
pub enum ListenerCommands {
    /// List listeners across all binds
    #[command(
        after_help = "EXAMPLES:\n    # List listeners from the loaded configuration\n    gwctl listener list\n\n    # Ask the gateway's listener endpoint directly\n    gwctl listener list --live --output json"
    )]
    List {
        /// Query the listener endpoint instead of the configuration tree
        #[arg(long)]
        live: bool,
    },

    /// Show one listener
    Get {
        /// Listener name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Create or replace a listener from a JSON or YAML file
    #[command(
        after_help = "EXAMPLES:\n    # Add a listener to the bind on port 8080\n    gwctl listener apply --port 8080 --file listener.yaml"
    )]
    Apply {
        /// Bind port; the bind is created when missing
        #[arg(long, value_name = "PORT")]
        port: u16,

        /// Path to the listener document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a listener
    Delete {
        /// Listener name
        #[arg(value_name = "NAME")]
        name: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// One listener row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_port: Option<u16>,
    pub name: String,
    pub protocol: String,
    pub routes: usize,
    pub tcp_routes: usize,
    pub policies: usize,
    pub tls: bool,
}

impl ListenerRow {
    fn new(bind_port: Option<u16>, listener: &Listener) -> Self {
        Self {
            bind_port,
            name: listener.display_name().to_string(),
            protocol: format!("{:?}", listener.protocol).to_uppercase(),
            routes: listener.http_routes().len(),
            tcp_routes: listener.tcp_routes().len(),
            policies: listener.policies().len(),
            tls: listener.is_tls_enabled(),
        }
    }
}

/// Rows for every listener in bind order
pub fn listener_rows(binds: &[Bind]) -> Vec<ListenerRow> {
    binds
        .iter()
        .flat_map(|bind| bind.listeners.iter().map(|l| ListenerRow::new(Some(bind.port), l)))
        .collect()
}

/// Handle listener commands
pub async fn handle_listener_command(
    command: ListenerCommands,
    ctx: &CommandContext,
) -> Result<()> {
    match command {
        ListenerCommands::List { live } => list_listeners(ctx, live).await,
        ListenerCommands::Get { name } => get_listener(ctx, &name),
        ListenerCommands::Apply { port, file } => apply_listener(ctx, port, file).await,
        ListenerCommands::Delete { name, yes } => delete_listener(ctx, &name, yes).await,
    }
}

async fn list_listeners(ctx: &CommandContext, live: bool) -> Result<()> {
    let rows = if live {
        let listeners =
            ctx.client.fetch_listeners().await.context("Failed to fetch listeners")?;
        listeners.iter().map(|l| ListenerRow::new(None, l)).collect()
    } else {
        listener_rows(&ctx.store.snapshot().binds)
    };

    print_with(&rows, ctx.format, |rows| print_listeners_table(rows))
}

fn get_listener(ctx: &CommandContext, name: &str) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let listener = snapshot
        .find_listener(name)
        .with_context(|| format!("Listener '{}' not found", name))?;

    print_with(listener, ctx.format, |listener| {
        print_listeners_table(&[ListenerRow::new(None, listener)])
    })
}

async fn apply_listener(ctx: &CommandContext, port: u16, file: PathBuf) -> Result<()> {
    let listener: Listener = read_resource(&file)?;
    let name = listener.display_name().to_string();

    ctx.store.upsert_listener(port, listener).await?;

    output::success(&format!("Listener '{}' saved on port {}", name, port));
    Ok(())
}

async fn delete_listener(ctx: &CommandContext, name: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Are you sure you want to delete listener '{}'?", name))? {
        println!("Cancelled");
        return Ok(());
    }

    ctx.store.remove_listener(name).await?;

    output::success(&format!("Listener '{}' deleted successfully", name));
    Ok(())
}

fn print_listeners_table(rows: &[ListenerRow]) {
    if rows.is_empty() {
        println!("No listeners found");
        return;
    }

    output::print_table_header(&[
        ("Port", 7),
        ("Name", 30),
        ("Protocol", 9),
        ("Routes", 7),
        ("TCP", 5),
        ("Policies", 9),
        ("TLS", 4),
    ]);

    for row in rows {
        println!(
            "{:<7} {:<30} {:<9} {:<7} {:<5} {:<9} {:<4}",
            row.bind_port.map_or("-".to_string(), |p| p.to_string()),
            truncate(&row.name, 28),
            row.protocol,
            row.routes,
            row.tcp_routes,
            row.policies,
            if row.tls { "yes" } else { "no" }
        );
    }
    println!();
}
