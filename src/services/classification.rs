//! Backend and target classification
//!
//! The gateway encodes the kind of a backend or target by which optional
//! sub-shape is populated. Classification tests each known shape in a fixed
//! priority order and the first match wins; a record with none of them is
//! `Unknown`, never an error. A shape counts as populated only when it
//! decodes, so a partially filled record falls through to `Unknown`.
//!
//! ## Adding a kind
//!
//! [`BACKEND_SHAPES`] and [`TARGET_SHAPES`] are the only place kinds are
//! recognised. A new kind needs a field on the raw wire struct, a variant on
//! the kind enum and one entry in the table below. The parsed enums in
//! `domain` will then fail to compile until the variant is handled.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::backend::{AiBackend, RawBackend};
use crate::domain::target::RawTarget;

/// Kind of a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Mcp,
    Ai,
    Service,
    Host,
    Dynamic,
    Unknown,
}

impl BackendKind {
    pub const ALL: [BackendKind; 6] = [
        BackendKind::Mcp,
        BackendKind::Ai,
        BackendKind::Service,
        BackendKind::Host,
        BackendKind::Dynamic,
        BackendKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Mcp => "mcp",
            BackendKind::Ai => "ai",
            BackendKind::Service => "service",
            BackendKind::Host => "host",
            BackendKind::Dynamic => "dynamic",
            BackendKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Stdio,
    Sse,
    OpenApi,
    Unknown,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Stdio => "stdio",
            TargetKind::Sse => "sse",
            TargetKind::OpenApi => "openapi",
            TargetKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BackendShapeTest = fn(&RawBackend) -> bool;
type TargetShapeTest = fn(&RawTarget) -> bool;

fn has_mcp(raw: &RawBackend) -> bool {
    raw.mcp().is_some()
}

fn has_ai(raw: &RawBackend) -> bool {
    raw.ai().is_some()
}

fn has_service(raw: &RawBackend) -> bool {
    raw.service().is_some()
}

fn has_host(raw: &RawBackend) -> bool {
    raw.host().is_some()
}

fn has_dynamic(raw: &RawBackend) -> bool {
    raw.dynamic().is_some()
}

/// Backend shapes in priority order
pub const BACKEND_SHAPES: &[(BackendKind, BackendShapeTest)] = &[
    (BackendKind::Mcp, has_mcp),
    (BackendKind::Ai, has_ai),
    (BackendKind::Service, has_service),
    (BackendKind::Host, has_host),
    (BackendKind::Dynamic, has_dynamic),
];

fn has_stdio(raw: &RawTarget) -> bool {
    raw.stdio().is_some()
}

fn has_sse(raw: &RawTarget) -> bool {
    raw.sse().is_some()
}

fn has_openapi(raw: &RawTarget) -> bool {
    raw.openapi().is_some()
}

/// Target shapes in priority order
pub const TARGET_SHAPES: &[(TargetKind, TargetShapeTest)] = &[
    (TargetKind::Stdio, has_stdio),
    (TargetKind::Sse, has_sse),
    (TargetKind::OpenApi, has_openapi),
];

/// Classify a backend record by its populated shape
pub fn classify_backend(raw: &RawBackend) -> BackendKind {
    BACKEND_SHAPES
        .iter()
        .find(|(_, populated)| populated(raw))
        .map(|(kind, _)| *kind)
        .unwrap_or(BackendKind::Unknown)
}

/// Classify a target record by its populated shape
pub fn classify_target(raw: &RawTarget) -> TargetKind {
    TARGET_SHAPES
        .iter()
        .find(|(_, populated)| populated(raw))
        .map(|(kind, _)| *kind)
        .unwrap_or(TargetKind::Unknown)
}

/// Classify an untyped JSON backend, e.g. one being edited as raw JSON.
/// Anything that is not an object with a recognisable shape is `Unknown`.
pub fn classify_backend_value(value: &Value) -> BackendKind {
    serde_json::from_value::<RawBackend>(value.clone())
        .map(|raw| classify_backend(&raw))
        .unwrap_or(BackendKind::Unknown)
}

/// Provider name of an AI backend (`openAI`, `anthropic`, `gemini`, ...)
pub fn ai_provider_name(ai: &AiBackend) -> &str {
    ai.provider.keys().next().map(String::as_str).unwrap_or("unknown")
}
