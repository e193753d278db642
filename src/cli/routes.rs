//! Route CLI commands
//!
//! HTTP routes live inside listeners; every command names the listener.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

use super::output::{self, print_with, truncate};
use super::{read_resource, CommandContext};
use crate::domain::{Backend, Route};

#[derive(Subcommand)]
pub enum RouteCommands {
    /// List HTTP routes of a listener
    List {
        /// Listener name
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,
    },

    /// Create or replace a named route from a JSON or YAML file
    #[command(
        after_help = "EXAMPLES:\n    # Save a route on the 'web' listener\n    gwctl route apply --listener web --file route.yaml"
    )]
    Apply {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Path to the route document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Replace the backends of a route from a JSON or YAML list
    Backends {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Route name
        #[arg(value_name = "ROUTE")]
        route: String,

        /// Path to the backend list
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Delete a route
    Delete {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Route name
        #[arg(value_name = "ROUTE")]
        route: String,
    },
}

/// One route row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRow {
    pub name: String,
    pub hostnames: Vec<String>,
    pub paths: Vec<String>,
    pub backends: Vec<String>,
    pub jwt: bool,
}

impl From<&Route> for RouteRow {
    fn from(route: &Route) -> Self {
        Self {
            name: route.name.clone().unwrap_or_else(|| "-".to_string()),
            hostnames: route.hostnames.clone(),
            paths: route
                .matches
                .iter()
                .map(|m| format!("{} {}", m.path.kind(), m.path.value()))
                .collect(),
            backends: route.backends.iter().map(Backend::describe).collect(),
            jwt: route.is_jwt_protected(),
        }
    }
}

/// Handle route commands
pub async fn handle_route_command(command: RouteCommands, ctx: &CommandContext) -> Result<()> {
    match command {
        RouteCommands::List { listener } => list_routes(ctx, &listener),
        RouteCommands::Apply { listener, file } => {
            let route: Route = read_resource(&file)?;
            let name = route.name.clone().unwrap_or_default();
            ctx.store.upsert_route(&listener, route).await?;
            output::success(&format!("Route '{}' saved on listener '{}'", name, listener));
            Ok(())
        }
        RouteCommands::Backends { listener, route, file } => {
            let backends: Vec<Backend> = read_resource(&file)?;
            let count = backends.len();
            ctx.store.set_route_backends(&listener, &route, backends).await?;
            output::success(&format!("Route '{}' now has {} backend(s)", route, count));
            Ok(())
        }
        RouteCommands::Delete { listener, route } => {
            ctx.store.remove_route(&listener, &route).await?;
            output::success(&format!("Route '{}' deleted from listener '{}'", route, listener));
            Ok(())
        }
    }
}

fn list_routes(ctx: &CommandContext, listener: &str) -> Result<()> {
    let snapshot = ctx.store.snapshot();
    let listener = snapshot
        .find_listener(listener)
        .with_context(|| format!("Listener '{}' not found", listener))?;
    let rows: Vec<RouteRow> = listener.http_routes().iter().map(RouteRow::from).collect();

    print_with(&rows, ctx.format, |rows| print_routes_table(rows))
}

fn print_routes_table(rows: &[RouteRow]) {
    if rows.is_empty() {
        println!("No routes found");
        return;
    }

    output::print_table_header(&[
        ("Name", 24),
        ("Hosts", 24),
        ("Match", 24),
        ("Backends", 36),
        ("JWT", 4),
    ]);

    for row in rows {
        println!(
            "{:<24} {:<24} {:<24} {:<36} {:<4}",
            truncate(&row.name, 22),
            truncate(&row.hostnames.join(","), 22),
            truncate(&row.paths.join(","), 22),
            truncate(&row.backends.join(","), 34),
            if row.jwt { "yes" } else { "no" }
        );
    }
    println!();
}
