//! RBAC policy CLI commands
//!
//! Rule sets are attached to listeners; the list view deduplicates them by
//! name and shows every listener using each one.

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::output::{self, print_with, truncate};
use super::{read_resource, CommandContext};
use crate::domain::{Resource, Rule, RuleSet};

#[derive(Subcommand)]
pub enum PolicyCommands {
    /// List policies with the listeners they are attached to
    List,

    /// Attach a rule set to a listener
    #[command(
        after_help = "EXAMPLES:\n    # Allow alice to call any tool\n    gwctl policy add --listener sse --name allow-alice --rule sub=alice\n\n    # Attach a rule set from a file\n    gwctl policy add --listener sse --file policy.yaml"
    )]
    Add {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Rule set name (ignored with --file)
        #[arg(long, required_unless_present = "file")]
        name: Option<String>,

        /// Rule set namespace
        #[arg(long, default_value = "default")]
        namespace: String,

        /// Claim rule as KEY=VALUE; repeatable
        #[arg(long = "rule", value_name = "KEY=VALUE")]
        rules: Vec<String>,

        /// Tool the rules apply to
        #[arg(long, default_value = Resource::WILDCARD)]
        tool: String,

        /// Path to a rule set document
        #[arg(short, long, value_name = "FILE", conflicts_with_all = ["name", "rules"])]
        file: Option<PathBuf>,
    },

    /// Detach a rule set from a listener
    Remove {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Rule set name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Evaluate a listener's policies against JWT claims
    Check {
        #[arg(short, long, value_name = "LISTENER")]
        listener: String,

        /// Tool being called
        #[arg(long)]
        tool: String,

        /// Claims as a JSON object
        #[arg(long, value_name = "JSON")]
        claims: String,
    },
}

/// One deduplicated policy row
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRow {
    pub name: String,
    pub namespace: String,
    pub rules: usize,
    pub listener_names: Vec<String>,
}

/// Handle policy commands
pub async fn handle_policy_command(command: PolicyCommands, ctx: &CommandContext) -> Result<()> {
    match command {
        PolicyCommands::List => list_policies(ctx),
        PolicyCommands::Add { listener, name, namespace, rules, tool, file } => {
            let rule_set = match file {
                Some(file) => read_resource(&file)?,
                None => build_rule_set(name.unwrap_or_default(), namespace, &rules, &tool)?,
            };
            let name = rule_set.name.clone();
            ctx.store.add_policy(&listener, rule_set).await?;
            output::success(&format!("Policy '{}' attached to listener '{}'", name, listener));
            Ok(())
        }
        PolicyCommands::Remove { listener, name } => {
            ctx.store.remove_policy(&listener, &name).await?;
            output::success(&format!("Policy '{}' removed from listener '{}'", name, listener));
            Ok(())
        }
        PolicyCommands::Check { listener, tool, claims } => {
            check_policies(ctx, &listener, &tool, &claims)
        }
    }
}

fn list_policies(ctx: &CommandContext) -> Result<()> {
    let rows: Vec<PolicyRow> = ctx
        .store
        .policy_view()
        .into_values()
        .map(|view| PolicyRow {
            name: view.rule_set.name,
            namespace: view.rule_set.namespace,
            rules: view.rule_set.rules.len(),
            listener_names: view.listener_names,
        })
        .collect();

    print_with(&rows, ctx.format, |rows| print_policies_table(rows))
}

/// Build a rule set from `KEY=VALUE` claim rules on one tool
fn build_rule_set(
    name: String,
    namespace: String,
    rules: &[String],
    tool: &str,
) -> Result<RuleSet> {
    rules.iter().try_fold(RuleSet::new(name, namespace), |rule_set, raw| {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("Invalid rule '{}': expected KEY=VALUE", raw))?;
        Ok(rule_set.with_rule(Rule::new(key.trim(), value.trim(), Resource::tool(tool))))
    })
}

fn check_policies(ctx: &CommandContext, listener: &str, tool: &str, claims: &str) -> Result<()> {
    let claims: Map<String, Value> =
        serde_json::from_str(claims).context("Claims must be a JSON object")?;
    let snapshot = ctx.store.snapshot();
    let listener = snapshot
        .find_listener(listener)
        .with_context(|| format!("Listener '{}' not found", listener))?;

    let resource = Resource::tool(tool);
    let denied: Vec<&str> = listener
        .policies()
        .iter()
        .filter(|policy| !policy.check(&claims, &resource))
        .map(|policy| policy.name.as_str())
        .collect();

    if denied.is_empty() {
        output::success(&format!("Allowed: '{}' on listener '{}'", tool, listener.display_name()));
        Ok(())
    } else {
        anyhow::bail!("Denied by: {}", denied.join(", "))
    }
}

fn print_policies_table(rows: &[PolicyRow]) {
    if rows.is_empty() {
        println!("No policies found");
        return;
    }

    output::print_table_header(&[("Name", 28), ("Namespace", 16), ("Rules", 6), ("Listeners", 40)]);

    for row in rows {
        println!(
            "{:<28} {:<16} {:<6} {:<40}",
            truncate(&row.name, 26),
            truncate(&row.namespace, 14),
            row.rules,
            truncate(&row.listener_names.join(", "), 38)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rules_from_pairs() {
        let rule_set = build_rule_set(
            "allow".to_string(),
            "default".to_string(),
            &["sub=alice".to_string(), "team = ops".to_string()],
            "echo",
        )
        .unwrap();

        assert_eq!(rule_set.rules.len(), 2);
        assert_eq!(rule_set.rules[1].key, "team");
        assert_eq!(rule_set.rules[1].value, "ops");
        assert_eq!(rule_set.rules[0].resource.id, "echo");
    }

    #[test]
    fn rejects_rule_without_separator() {
        let rules = ["sub".to_string()];
        let result = build_rule_set("p".to_string(), "default".to_string(), &rules, "*");
        assert!(result.is_err());
    }
}
