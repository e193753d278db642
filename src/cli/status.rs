//! Status, statistics and validation commands

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use super::output::{self, print_with};
use super::CommandContext;
use crate::services::aggregation::{BackendStats, ListenerSummary, RouteStats, TargetStats};
use crate::services::classification::BackendKind;
use crate::store::{StoreState, StoreStatus};

/// Aggregated view printed by `gwctl stats`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub backends: BackendStats,
    pub routes: RouteStats,
    pub listeners: ListenerSummary,
    pub targets: TargetStats,
}

pub fn show_status(ctx: &CommandContext) -> Result<()> {
    let status = ctx.store.status();
    print_with(&status, ctx.format, print_status)?;

    if ctx.format == output::OutputFormat::Table {
        if let Some(cached) = ctx.store.cached_configuration() {
            println!(
                "Cached configuration: version {} ({} binds)",
                cached.version,
                cached.binds.len()
            );
        }
    }
    Ok(())
}

fn print_status(status: &StoreStatus) {
    let state = match status.state {
        StoreState::Connected => "connected".green().to_string(),
        StoreState::Error => "error".red().to_string(),
        StoreState::Loading => "loading".yellow().to_string(),
        StoreState::Uninitialized => "uninitialized".dimmed().to_string(),
    };

    println!();
    println!("{:<16} {}", "State", state);
    println!("{:<16} {:?}", "Source", status.source);
    println!("{:<16} {}", "Read only", if status.read_only { "yes" } else { "no" });
    println!("{:<16} {}", "Version", status.version);
    println!(
        "{:<16} {}",
        "Last synced",
        status.last_synced.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".to_string())
    );
    if let Some(error) = &status.connection_error {
        println!("{:<16} {}", "Error", error.red());
    }
    println!();
}

pub fn show_stats(ctx: &CommandContext) -> Result<()> {
    let report = StatsReport {
        backends: ctx.store.backend_stats(),
        routes: ctx.store.route_stats(),
        listeners: ctx.store.listener_summary(),
        targets: ctx.store.target_stats(),
    };
    print_with(&report, ctx.format, print_stats)
}

fn print_stats(report: &StatsReport) {
    output::print_table_header(&[("Metric", 28), ("Count", 8)]);
    let row = |name: &str, count: usize| println!("{:<28} {:<8}", name, count);

    row("backends", report.backends.total_backends);
    for kind in BackendKind::ALL {
        row(&format!("  {}", kind), report.backends.count(kind));
    }
    row("binds with backends", report.backends.binds_with_backends);
    row("http routes", report.routes.total_routes);
    row("tcp routes", report.routes.total_tcp_routes);
    row("binds with routes", report.routes.binds_with_routes);
    row("listeners", report.listeners.total_listeners);
    row("  with routes", report.listeners.listeners_with_routes.len());
    row("  with tls", report.listeners.tls_listeners);
    row("  with policies", report.listeners.listeners_with_policies);
    row("jwt protected routes", report.listeners.jwt_protected_routes);
    row("targets", report.targets.total_targets);
    for (kind, count) in &report.targets.by_kind {
        row(&format!("  {}", kind), *count);
    }
    println!();
}

/// Report listeners with both HTTP and TCP routes; fails when any exist
pub fn validate(ctx: &CommandContext) -> Result<()> {
    let invalid = ctx.store.invalid_listeners();

    print_with(&invalid, ctx.format, |invalid| {
        if invalid.is_empty() {
            output::success("All listeners are valid");
            return;
        }
        output::print_table_header(&[("Port", 7), ("Listener", 30), ("Problem", 36)]);
        for entry in invalid {
            println!(
                "{:<7} {:<30} {:<36}",
                entry.bind_port,
                output::truncate(&entry.listener_name, 28),
                "has both routes and tcpRoutes".red()
            );
        }
        println!();
    })?;

    if !invalid.is_empty() {
        anyhow::bail!("{} invalid listener(s)", invalid.len());
    }
    Ok(())
}
