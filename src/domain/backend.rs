//! Backend domain types
//!
//! A route forwards to one or more backends. The wire record carries exactly
//! one populated sub-shape (`mcp`, `ai`, `service`, `host` or `dynamic`) and an
//! optional `weight`. [`Backend`] resolves the shape into [`BackendTarget`]
//! when it is parsed so the rest of the crate matches on a closed enum.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::target::Target;
use crate::services::classification::{classify_backend, BackendKind};

/// Backend fanning out to MCP targets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpBackend {
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// Backend fronting an AI provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiBackend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Single-entry map of provider name to provider settings
    #[serde(default)]
    pub provider: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_override: Option<String>,
}

/// In-cluster service addressed as `<namespace>/<hostname>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBackend {
    pub name: String,
    pub port: u16,
}

impl ServiceBackend {
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once('/').map(|(namespace, _)| namespace)
    }

    pub fn hostname(&self) -> &str {
        self.name.split_once('/').map_or(self.name.as_str(), |(_, host)| host)
    }
}

/// Marker for backends resolved from the request at runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicBackend {}

/// Wire shape of a backend before its kind is resolved
///
/// Sub-shapes are kept as raw JSON so a partially filled or newer record
/// still parses; the typed accessors return `None` for a shape that does not
/// decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBackend {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Decode a populated sub-shape, `None` when absent or malformed
pub(crate) fn decode_shape<T: DeserializeOwned>(shape: &Option<Value>) -> Option<T> {
    shape.as_ref().and_then(|value| T::deserialize(value).ok())
}

impl RawBackend {
    pub fn mcp(&self) -> Option<McpBackend> {
        decode_shape(&self.mcp)
    }

    pub fn ai(&self) -> Option<AiBackend> {
        decode_shape(&self.ai)
    }

    pub fn service(&self) -> Option<ServiceBackend> {
        decode_shape(&self.service)
    }

    pub fn host(&self) -> Option<String> {
        decode_shape(&self.host)
    }

    pub fn dynamic(&self) -> Option<DynamicBackend> {
        match &self.dynamic {
            Some(Value::Object(_)) => Some(DynamicBackend {}),
            _ => None,
        }
    }
}

/// Where a backend sends traffic
#[derive(Debug, Clone, PartialEq)]
pub enum BackendTarget {
    Mcp(McpBackend),
    Ai(AiBackend),
    Service(ServiceBackend),
    /// Static `hostname:port`
    Host(String),
    Dynamic,
    /// None of the known shapes; raw fields are kept in `Backend::extra`
    Unknown,
}

/// A parsed backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBackend", into = "RawBackend")]
pub struct Backend {
    pub weight: Option<u32>,
    pub target: BackendTarget,
    pub extra: BTreeMap<String, Value>,
}

impl Backend {
    pub fn new(target: BackendTarget) -> Self {
        Self {
            weight: None,
            target,
            extra: BTreeMap::new(),
        }
    }

    pub fn host<S: Into<String>>(host: S) -> Self {
        Self::new(BackendTarget::Host(host.into()))
    }

    pub fn service<S: Into<String>>(name: S, port: u16) -> Self {
        Self::new(BackendTarget::Service(ServiceBackend {
            name: name.into(),
            port,
        }))
    }

    pub fn mcp(targets: Vec<Target>) -> Self {
        Self::new(BackendTarget::Mcp(McpBackend { targets }))
    }

    pub fn ai<S: Into<String>>(provider: S, settings: Value) -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(provider.into(), settings);
        Self::new(BackendTarget::Ai(AiBackend {
            name: None,
            provider: providers,
            host_override: None,
        }))
    }

    pub fn dynamic() -> Self {
        Self::new(BackendTarget::Dynamic)
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn kind(&self) -> BackendKind {
        match self.target {
            BackendTarget::Mcp(_) => BackendKind::Mcp,
            BackendTarget::Ai(_) => BackendKind::Ai,
            BackendTarget::Service(_) => BackendKind::Service,
            BackendTarget::Host(_) => BackendKind::Host,
            BackendTarget::Dynamic => BackendKind::Dynamic,
            BackendTarget::Unknown => BackendKind::Unknown,
        }
    }

    /// Short human readable destination for tables and logs
    pub fn describe(&self) -> String {
        match &self.target {
            BackendTarget::Mcp(mcp) => format!("mcp ({} targets)", mcp.targets.len()),
            BackendTarget::Ai(ai) => {
                let provider = ai.provider.keys().next().map(String::as_str).unwrap_or("unknown");
                format!("ai ({})", provider)
            }
            BackendTarget::Service(service) => format!("{}:{}", service.name, service.port),
            BackendTarget::Host(host) => host.clone(),
            BackendTarget::Dynamic => "dynamic".to_string(),
            BackendTarget::Unknown => "unknown".to_string(),
        }
    }
}

impl From<RawBackend> for Backend {
    fn from(raw: RawBackend) -> Self {
        let kind = classify_backend(&raw);
        let target = match kind {
            BackendKind::Mcp => raw.mcp().map(BackendTarget::Mcp),
            BackendKind::Ai => raw.ai().map(BackendTarget::Ai),
            BackendKind::Service => raw.service().map(BackendTarget::Service),
            BackendKind::Host => raw.host().map(BackendTarget::Host),
            BackendKind::Dynamic => raw.dynamic().map(|_| BackendTarget::Dynamic),
            BackendKind::Unknown => None,
        };

        // Sub-shapes that did not become the target are written back as-is
        let RawBackend { weight, mcp, ai, service, host, dynamic, mut extra } = raw;
        let shapes = [
            (BackendKind::Mcp, "mcp", mcp),
            (BackendKind::Ai, "ai", ai),
            (BackendKind::Service, "service", service),
            (BackendKind::Host, "host", host),
            (BackendKind::Dynamic, "dynamic", dynamic),
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
            weight,
            target: target.unwrap_or(BackendTarget::Unknown),
            extra,
        }
    }
}

impl From<Backend> for RawBackend {
    fn from(backend: Backend) -> Self {
        let mut raw = RawBackend {
            weight: backend.weight,
            extra: backend.extra,
            ..RawBackend::default()
        };
        match backend.target {
            BackendTarget::Mcp(mcp) => raw.mcp = serde_json::to_value(mcp).ok(),
            BackendTarget::Ai(ai) => raw.ai = serde_json::to_value(ai).ok(),
            BackendTarget::Service(service) => raw.service = serde_json::to_value(service).ok(),
            BackendTarget::Host(host) => raw.host = Some(Value::String(host)),
            BackendTarget::Dynamic => raw.dynamic = Some(Value::Object(Default::default())),
            BackendTarget::Unknown => {}
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_each_backend_shape() {
        let cases = [
            (json!({"host": "example.com:443"}), BackendKind::Host),
            (json!({"service": {"name": "default/httpbin", "port": 8000}}), BackendKind::Service),
            (json!({"dynamic": {}}), BackendKind::Dynamic),
            (json!({"mcp": {"targets": []}}), BackendKind::Mcp),
            (json!({"ai": {"provider": {"openAI": {"model": "gpt-4o"}}}}), BackendKind::Ai),
            (json!({}), BackendKind::Unknown),
        ];

        for (value, expected) in cases {
            let backend: Backend = serde_json::from_value(value.clone()).unwrap();
            assert_eq!(backend.kind(), expected, "backend {}", value);
        }
    }

    #[test]
    fn weight_and_unknown_fields_round_trip() {
        let value = json!({"weight": 3, "host": "a:80", "futureField": true});
        let backend: Backend = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(backend.weight, Some(3));
        assert_eq!(backend.extra.get("futureField"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&backend).unwrap(), value);
    }

    #[test]
    fn partially_filled_shape_is_unknown_and_round_trips() {
        let value = json!({"service": {"name": "default/svc"}});
        let backend: Backend = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(backend.kind(), BackendKind::Unknown);
        assert_eq!(backend.extra.get("service"), Some(&json!({"name": "default/svc"})));
        assert_eq!(serde_json::to_value(&backend).unwrap(), value);
    }

    #[test]
    fn malformed_shape_falls_through_to_next_kind() {
        let value = json!({"service": {"port": "eighty"}, "host": "a:80"});
        let backend: Backend = serde_json::from_value(value.clone()).unwrap();

        assert_eq!(backend.target, BackendTarget::Host("a:80".to_string()));
        assert_eq!(serde_json::to_value(&backend).unwrap(), value);
    }

    #[test]
    fn mistyped_host_is_unknown() {
        let backend: Backend = serde_json::from_value(json!({"host": 8080})).unwrap();
        assert_eq!(backend.kind(), BackendKind::Unknown);
    }

    #[test]
    fn dynamic_serializes_as_empty_object() {
        let value = serde_json::to_value(Backend::dynamic()).unwrap();
        assert_eq!(value, json!({"dynamic": {}}));
    }

    #[test]
    fn service_name_parts() {
        let service = ServiceBackend {
            name: "default/httpbin".to_string(),
            port: 8000,
        };
        assert_eq!(service.namespace(), Some("default"));
        assert_eq!(service.hostname(), "httpbin");

        let bare = ServiceBackend {
            name: "httpbin".to_string(),
            port: 8000,
        };
        assert_eq!(bare.namespace(), None);
        assert_eq!(bare.hostname(), "httpbin");
    }

    #[test]
    fn describe_backends() {
        assert_eq!(Backend::host("a:80").describe(), "a:80");
        assert_eq!(Backend::ai("anthropic", json!({})).describe(), "ai (anthropic)");
        assert_eq!(Backend::service("ns/svc", 80).describe(), "ns/svc:80");
    }
}
