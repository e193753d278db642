//! Route domain types
//!
//! HTTP routes map request matchers to weighted backends and may carry a
//! policy bag. TCP routes are passthrough and only select backends by
//! hostname.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::backend::Backend;

/// Path matching strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathMatch {
    Exact(String),
    PathPrefix(String),
    Regex(String),
}

impl Default for PathMatch {
    fn default() -> Self {
        PathMatch::PathPrefix("/".to_string())
    }
}

impl PathMatch {
    pub fn value(&self) -> &str {
        match self {
            PathMatch::Exact(v) | PathMatch::PathPrefix(v) | PathMatch::Regex(v) => v,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PathMatch::Exact(_) => "exact",
            PathMatch::PathPrefix(_) => "pathPrefix",
            PathMatch::Regex(_) => "regex",
        }
    }
}

/// String comparison used by header and query matchers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringMatch {
    Exact(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMatch {
    pub name: String,
    pub value: StringMatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMatch {
    pub name: String,
    pub value: StringMatch,
}

/// A single match predicate; all populated parts must match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMatch {
    #[serde(default)]
    pub path: PathMatch,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub query: Vec<QueryMatch>,
}

impl RouteMatch {
    pub fn path(path: PathMatch) -> Self {
        Self {
            path,
            ..Self::default()
        }
    }
}

/// Where the JWKS used to verify tokens comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JwksSource {
    File(String),
    Url(String),
    Inline(String),
}

/// JWT authentication descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtAuth {
    pub issuer: String,
    #[serde(default)]
    pub audiences: Vec<String>,
    pub jwks: JwksSource,
}

/// Route level policies. Only `jwtAuth` is modelled; everything else is
/// carried verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePolicies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_auth: Option<JwtAuth>,
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl RoutePolicies {
    pub fn is_empty(&self) -> bool {
        self.jwt_auth.is_none() && self.other.is_empty()
    }
}

/// HTTP route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub matches: Vec<RouteMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policies: Option<RoutePolicies>,
    #[serde(default)]
    pub backends: Vec<Backend>,
}

impl Route {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_match(mut self, route_match: RouteMatch) -> Self {
        self.matches.push(route_match);
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn with_jwt_auth(mut self, jwt_auth: JwtAuth) -> Self {
        self.policies.get_or_insert_with(RoutePolicies::default).jwt_auth = Some(jwt_auth);
        self
    }

    pub fn jwt_auth(&self) -> Option<&JwtAuth> {
        self.policies.as_ref().and_then(|p| p.jwt_auth.as_ref())
    }

    pub fn is_jwt_protected(&self) -> bool {
        self.jwt_auth().is_some()
    }

    /// Whether this route is the one addressed by `name`
    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// TCP passthrough route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TcpRoute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub backends: Vec<Backend>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_match_defaults_to_root_prefix() {
        let route_match: RouteMatch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(route_match.path, PathMatch::PathPrefix("/".to_string()));
        assert_eq!(route_match.path.kind(), "pathPrefix");
    }

    #[test]
    fn path_match_wire_format() {
        let value = serde_json::to_value(PathMatch::Exact("/health".into())).unwrap();
        assert_eq!(value, json!({"exact": "/health"}));

        let parsed: PathMatch = serde_json::from_value(json!({"regex": "^/v[0-9]+/"})).unwrap();
        assert_eq!(parsed.value(), "^/v[0-9]+/");
    }

    #[test]
    fn policies_keep_unmodelled_entries() {
        let value = json!({
            "jwtAuth": {"issuer": "me", "audiences": ["api"], "jwks": {"file": "/etc/jwks.json"}},
            "cors": {"allowOrigins": ["*"]}
        });
        let policies: RoutePolicies = serde_json::from_value(value.clone()).unwrap();

        assert!(policies.jwt_auth.is_some());
        assert!(policies.other.contains_key("cors"));
        assert_eq!(serde_json::to_value(&policies).unwrap(), value);
    }

    #[test]
    fn route_builder() {
        let route = Route::new("api")
            .with_match(RouteMatch::path(PathMatch::PathPrefix("/api".into())))
            .with_backend(Backend::host("api:8080"))
            .with_jwt_auth(JwtAuth {
                issuer: "issuer".into(),
                audiences: vec![],
                jwks: JwksSource::Url("https://issuer/jwks".into()),
            });

        assert!(route.is_named("api"));
        assert!(route.is_jwt_protected());
        assert_eq!(route.backends.len(), 1);
    }
}
