//! Aggregated views over the configuration tree
//!
//! Every function here is pure: it borrows the binds (or targets), never
//! mutates them and returns owned summaries. Results are recomputed on each
//! call; nothing is cached between calls.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::bind::Bind;
use crate::domain::policy::RuleSet;
use crate::domain::target::{Target, TargetType};
use crate::services::classification::{BackendKind, TargetKind};

/// Backend counts across every HTTP route
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStats {
    pub total_backends: usize,
    pub mcp_backends: usize,
    pub ai_backends: usize,
    pub service_backends: usize,
    pub host_backends: usize,
    pub dynamic_backends: usize,
    pub unknown_backends: usize,
    pub binds_with_backends: usize,
}

impl BackendStats {
    pub fn count(&self, kind: BackendKind) -> usize {
        match kind {
            BackendKind::Mcp => self.mcp_backends,
            BackendKind::Ai => self.ai_backends,
            BackendKind::Service => self.service_backends,
            BackendKind::Host => self.host_backends,
            BackendKind::Dynamic => self.dynamic_backends,
            BackendKind::Unknown => self.unknown_backends,
        }
    }

    fn record(&mut self, kind: BackendKind) {
        self.total_backends += 1;
        let slot = match kind {
            BackendKind::Mcp => &mut self.mcp_backends,
            BackendKind::Ai => &mut self.ai_backends,
            BackendKind::Service => &mut self.service_backends,
            BackendKind::Host => &mut self.host_backends,
            BackendKind::Dynamic => &mut self.dynamic_backends,
            BackendKind::Unknown => &mut self.unknown_backends,
        };
        *slot += 1;
    }
}

/// Route counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStats {
    pub total_routes: usize,
    pub total_tcp_routes: usize,
    pub binds_with_routes: usize,
}

/// Reference to a listener inside its bind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerRef {
    pub bind_port: u16,
    pub listener_name: String,
}

/// Listener level summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerSummary {
    pub total_listeners: usize,
    pub listeners_with_routes: Vec<ListenerRef>,
    pub tls_listeners: usize,
    pub listeners_with_policies: usize,
    pub jwt_protected_routes: usize,
}

/// One logical policy and every listener it is attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyView {
    /// Rule set body as first seen in traversal order
    #[serde(flatten)]
    pub rule_set: RuleSet,
    /// Attachment points in traversal order, without duplicates
    pub listener_names: Vec<String>,
}

/// Target counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStats {
    pub total_targets: usize,
    pub by_kind: BTreeMap<TargetKind, usize>,
    pub by_type: BTreeMap<TargetType, usize>,
    pub untyped: usize,
}

/// Count backends by kind, walking each HTTP route's backends once
pub fn backend_stats(binds: &[Bind]) -> BackendStats {
    let mut stats = BackendStats::default();
    for bind in binds {
        let before = stats.total_backends;
        for backend in bind
            .listeners
            .iter()
            .flat_map(|listener| listener.http_routes())
            .flat_map(|route| route.backends.iter())
        {
            stats.record(backend.kind());
        }
        if stats.total_backends > before {
            stats.binds_with_backends += 1;
        }
    }
    stats
}

/// Count HTTP and TCP routes
pub fn route_stats(binds: &[Bind]) -> RouteStats {
    let mut stats = RouteStats::default();
    for bind in binds {
        let http: usize = bind.listeners.iter().map(|l| l.http_routes().len()).sum();
        let tcp: usize = bind.listeners.iter().map(|l| l.tcp_routes().len()).sum();
        stats.total_routes += http;
        stats.total_tcp_routes += tcp;
        if http + tcp > 0 {
            stats.binds_with_routes += 1;
        }
    }
    stats
}

/// Policies keyed by name. The first sighting of a name supplies the rule set
/// body; later sightings only add their listener to `listener_names`.
pub fn policy_view(binds: &[Bind]) -> BTreeMap<String, PolicyView> {
    let mut view: BTreeMap<String, PolicyView> = BTreeMap::new();
    for listener in binds.iter().flat_map(|bind| bind.listeners.iter()) {
        let listener_name = listener.display_name();
        for rule_set in listener.policies() {
            let entry = view.entry(rule_set.name.clone()).or_insert_with(|| PolicyView {
                rule_set: rule_set.clone(),
                listener_names: Vec::new(),
            });
            if !entry.listener_names.iter().any(|n| n == listener_name) {
                entry.listener_names.push(listener_name.to_string());
            }
        }
    }
    view
}

/// Distinct rule sets in first-sighting order
pub fn flatten_policies(binds: &[Bind]) -> Vec<RuleSet> {
    let mut seen: Vec<&str> = Vec::new();
    let mut policies = Vec::new();
    for rule_set in binds
        .iter()
        .flat_map(|bind| bind.listeners.iter())
        .flat_map(|listener| listener.policies())
    {
        if !seen.contains(&rule_set.name.as_str()) {
            seen.push(&rule_set.name);
            policies.push(rule_set.clone());
        }
    }
    policies
}

/// Listener counts and the listeners that carry routes
pub fn listener_summary(binds: &[Bind]) -> ListenerSummary {
    let mut summary = ListenerSummary::default();
    for bind in binds {
        for listener in &bind.listeners {
            summary.total_listeners += 1;
            if listener.has_routes() {
                summary.listeners_with_routes.push(ListenerRef {
                    bind_port: bind.port,
                    listener_name: listener.display_name().to_string(),
                });
            }
            if listener.is_tls_enabled() {
                summary.tls_listeners += 1;
            }
            if !listener.policies().is_empty() {
                summary.listeners_with_policies += 1;
            }
            summary.jwt_protected_routes +=
                listener.http_routes().iter().filter(|r| r.is_jwt_protected()).count();
        }
    }
    summary
}

/// Count targets by kind and by collection tag
pub fn target_stats(targets: &[Target]) -> TargetStats {
    let mut stats = TargetStats {
        total_targets: targets.len(),
        ..TargetStats::default()
    };
    for target in targets {
        *stats.by_kind.entry(target.kind()).or_insert(0) += 1;
        match target.target_type {
            Some(target_type) => *stats.by_type.entry(target_type).or_insert(0) += 1,
            None => stats.untyped += 1,
        }
    }
    stats
}
