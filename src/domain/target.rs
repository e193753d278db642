//! Target domain types
//!
//! Targets are the MCP/A2A-style upstreams fetched outside the bind tree.
//! On the wire a target is a record where one of `stdio`, `sse` or `openapi`
//! is populated; the kind is resolved once at parse time into [`TargetSpec`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::backend::decode_shape;
use crate::services::classification::{classify_target, TargetKind};

/// Collection a target was fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Mcp,
    A2a,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetType::Mcp => "mcp",
            TargetType::A2a => "a2a",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mcp" => Ok(TargetType::Mcp),
            "a2a" => Ok(TargetType::A2a),
            other => Err(format!("unknown target type '{}' (expected mcp or a2a)", other)),
        }
    }
}

/// Local process spoken to over stdin/stdout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdioTarget {
    pub cmd: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// Remote server reached over server-sent events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseTarget {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// HTTP API described by an OpenAPI schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiTarget {
    pub host: String,
    pub port: u16,
    /// Schema location or inline document
    #[serde(default)]
    pub schema: Value,
}

/// Wire shape of a target before its kind is resolved. Sub-shapes stay raw
/// JSON until classification picks one that decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTarget {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdio: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<TargetType>,
    /// Fields this client does not understand, kept so they round-trip
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawTarget {
    pub fn stdio(&self) -> Option<StdioTarget> {
        decode_shape(&self.stdio)
    }

    pub fn sse(&self) -> Option<SseTarget> {
        decode_shape(&self.sse)
    }

    pub fn openapi(&self) -> Option<OpenApiTarget> {
        decode_shape(&self.openapi)
    }
}

/// Resolved target kind with its payload
#[derive(Debug, Clone, PartialEq)]
pub enum TargetSpec {
    Stdio(StdioTarget),
    Sse(SseTarget),
    OpenApi(OpenApiTarget),
    /// No known shape was populated; the raw fields live in `Target::extra`
    Unknown,
}

/// A parsed target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTarget", into = "RawTarget")]
pub struct Target {
    pub name: String,
    pub spec: TargetSpec,
    /// Tag attached when the mcp and a2a collections are merged
    pub target_type: Option<TargetType>,
    pub extra: BTreeMap<String, Value>,
}

impl Target {
    pub fn new<S: Into<String>>(name: S, spec: TargetSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            target_type: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn stdio<S: Into<String>, C: Into<String>>(name: S, cmd: C, args: Vec<String>) -> Self {
        Self::new(
            name,
            TargetSpec::Stdio(StdioTarget {
                cmd: cmd.into(),
                args,
                env: BTreeMap::new(),
            }),
        )
    }

    pub fn sse<S: Into<String>, H: Into<String>, P: Into<String>>(
        name: S,
        host: H,
        port: u16,
        path: P,
    ) -> Self {
        Self::new(
            name,
            TargetSpec::Sse(SseTarget {
                host: host.into(),
                port,
                path: path.into(),
                headers: BTreeMap::new(),
            }),
        )
    }

    pub fn openapi<S: Into<String>, H: Into<String>>(
        name: S,
        host: H,
        port: u16,
        schema: Value,
    ) -> Self {
        Self::new(name, TargetSpec::OpenApi(OpenApiTarget {
            host: host.into(),
            port,
            schema,
        }))
    }

    /// Attach the collection tag
    pub fn with_type(mut self, target_type: TargetType) -> Self {
        self.target_type = Some(target_type);
        self
    }

    pub fn kind(&self) -> TargetKind {
        match self.spec {
            TargetSpec::Stdio(_) => TargetKind::Stdio,
            TargetSpec::Sse(_) => TargetKind::Sse,
            TargetSpec::OpenApi(_) => TargetKind::OpenApi,
            TargetSpec::Unknown => TargetKind::Unknown,
        }
    }
}

impl From<RawTarget> for Target {
    fn from(raw: RawTarget) -> Self {
        let kind = classify_target(&raw);
        let spec = match kind {
            TargetKind::Stdio => raw.stdio().map(TargetSpec::Stdio),
            TargetKind::Sse => raw.sse().map(TargetSpec::Sse),
            TargetKind::OpenApi => raw.openapi().map(TargetSpec::OpenApi),
            TargetKind::Unknown => None,
        };

        let RawTarget { name, stdio, sse, openapi, target_type, mut extra } = raw;
        let shapes = [
            (TargetKind::Stdio, "stdio", stdio),
            (TargetKind::Sse, "sse", sse),
            (TargetKind::OpenApi, "openapi", openapi),
        ];
        for (shape_kind, key, value) in shapes {
            if shape_kind == kind {
                continue;
            }
            if let Some(value) = value {
                extra.insert(key.to_string(), value);
            }
        }

        Self {
            name,
            spec: spec.unwrap_or(TargetSpec::Unknown),
            target_type,
            extra,
        }
    }
}

impl From<Target> for RawTarget {
    fn from(target: Target) -> Self {
        let mut raw = RawTarget {
            name: target.name,
            target_type: target.target_type,
            extra: target.extra,
            ..RawTarget::default()
        };
        match target.spec {
            TargetSpec::Stdio(stdio) => raw.stdio = serde_json::to_value(stdio).ok(),
            TargetSpec::Sse(sse) => raw.sse = serde_json::to_value(sse).ok(),
            TargetSpec::OpenApi(openapi) => raw.openapi = serde_json::to_value(openapi).ok(),
            TargetSpec::Unknown => {}
        }
        raw
    }
}

/// Merge the separately fetched collections, tagging each entry with its type.
/// MCP targets come first, each collection keeps its fetch order.
pub fn merge_target_collections(mcp: Vec<Target>, a2a: Vec<Target>) -> Vec<Target> {
    mcp.into_iter()
        .map(|t| t.with_type(TargetType::Mcp))
        .chain(a2a.into_iter().map(|t| t.with_type(TargetType::A2a)))
        .collect()
}

/// Targets of one type, with the synthesized tag removed for writing back
pub fn targets_of_type(targets: &[Target], target_type: TargetType) -> Vec<Target> {
    targets
        .iter()
        .filter(|t| t.target_type == Some(target_type))
        .cloned()
        .map(|mut t| {
            t.target_type = None;
            t
        })
        .collect()
}
