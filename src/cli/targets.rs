//! MCP / A2A target CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;

use super::output::{self, print_with, truncate};
use super::{read_resource, CommandContext};
use crate::domain::{Target, TargetSpec, TargetType};

#[derive(Subcommand)]
pub enum TargetCommands {
    /// List targets of both collections
    List {
        /// Only show one collection
        #[arg(long = "type", value_name = "TYPE")]
        target_type: Option<TargetType>,
    },

    /// Add a target from a JSON or YAML file
    #[command(
        after_help = "EXAMPLES:\n    # Add an MCP stdio target\n    gwctl target add --type mcp --file everything.yaml"
    )]
    Add {
        #[arg(long = "type", value_name = "TYPE", default_value = "mcp")]
        target_type: TargetType,

        /// Path to the target document
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,
    },

    /// Remove a target
    Remove {
        #[arg(long = "type", value_name = "TYPE", default_value = "mcp")]
        target_type: TargetType,

        /// Target name
        #[arg(value_name = "NAME")]
        name: String,
    },
}

/// One target row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRow {
    pub name: String,
    #[serde(rename = "type")]
    pub target_type: Option<TargetType>,
    pub kind: String,
    pub endpoint: String,
}

impl From<&Target> for TargetRow {
    fn from(target: &Target) -> Self {
        let endpoint = match &target.spec {
            TargetSpec::Stdio(stdio) => {
                std::iter::once(stdio.cmd.as_str())
                    .chain(stdio.args.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            TargetSpec::Sse(sse) => format!("{}:{}{}", sse.host, sse.port, sse.path),
            TargetSpec::OpenApi(openapi) => format!("{}:{}", openapi.host, openapi.port),
            TargetSpec::Unknown => "-".to_string(),
        };
        Self {
            name: target.name.clone(),
            target_type: target.target_type,
            kind: target.kind().to_string(),
            endpoint,
        }
    }
}

/// Handle target commands
pub async fn handle_target_command(command: TargetCommands, ctx: &CommandContext) -> Result<()> {
    match command {
        TargetCommands::List { target_type } => {
            let rows: Vec<TargetRow> = ctx
                .store
                .snapshot()
                .targets
                .iter()
                .filter(|t| target_type.is_none() || t.target_type == target_type)
                .map(TargetRow::from)
                .collect();
            print_with(&rows, ctx.format, |rows| print_targets_table(rows))
        }
        TargetCommands::Add { target_type, file } => {
            let target: Target = read_resource(&file)?;
            let name = target.name.clone();
            ctx.store.add_target(target_type, target).await?;
            output::success(&format!("{} target '{}' added", target_type, name));
            Ok(())
        }
        TargetCommands::Remove { target_type, name } => {
            ctx.store.remove_target(target_type, &name).await?;
            output::success(&format!("{} target '{}' removed", target_type, name));
            Ok(())
        }
    }
}

fn print_targets_table(rows: &[TargetRow]) {
    if rows.is_empty() {
        println!("No targets found");
        return;
    }

    output::print_table_header(&[("Name", 28), ("Type", 5), ("Kind", 8), ("Endpoint", 44)]);

    for row in rows {
        println!(
            "{:<28} {:<5} {:<8} {:<44}",
            truncate(&row.name, 26),
            row.target_type.map_or("-", |t| t.as_str()),
            row.kind,
            truncate(&row.endpoint, 42)
        );
    }
    println!();
}
