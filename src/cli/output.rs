//! Rendering for command results
//!
//! Every listing command can emit JSON or YAML of its serializable view, or
//! a fixed-width table drawn by the command itself.

use anyhow::{Context, Result};
use clap::ValueEnum;
use owo_colors::OwoColorize;
use serde::Serialize;

/// `-o/--output` choices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    #[default]
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| anyhow::anyhow!("Unknown output format '{}' (json, yaml, table)", s))
    }
}

/// Serialize `data` for the structured formats; `None` for tables
pub fn render<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> Result<Option<String>> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Cannot render JSON")?,
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Cannot render YAML")?,
        OutputFormat::Table => return Ok(None),
    };
    Ok(Some(text))
}

/// Print `data` in the chosen format, drawing tables with `table`
pub fn print_with<T: Serialize>(
    data: &T,
    format: OutputFormat,
    table: impl FnOnce(&T),
) -> Result<()> {
    match render(data, format)? {
        Some(text) => println!("{}", text.trim_end()),
        None => table(data),
    }
    Ok(())
}

/// Shorten `s` to at most `max_len` characters, marking the cut with "..."
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Bold column titles followed by a rule as wide as the columns
pub fn print_table_header(columns: &[(&str, usize)]) {
    let titles = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = *width))
        .collect::<Vec<_>>()
        .join(" ");
    let rule_width = columns.iter().map(|(_, width)| *width).sum::<usize>()
        + columns.len().saturating_sub(1);

    println!();
    println!("{}", titles.trim_end().bold());
    println!("{}", "-".repeat(rule_width));
}

pub fn success(message: &str) {
    println!("{}", message.green());
}

/// Warnings go to stderr so piped json/yaml stays parseable
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow());
}
