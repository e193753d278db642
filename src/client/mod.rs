//! Remote gateway client
//!
//! [`GatewayApi`] is the boundary between the configuration store and the
//! gateway's admin API. Implementations are stateless: every call is an
//! independent round trip with no internal retries. Failures surface as
//! [`GwctlError::Transport`] (network or status) or
//! [`GwctlError::MalformedResponse`] (a body that cannot be normalized).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Bind, ConfigDocument, Listener, RuleSet, Target, TargetType};
use crate::errors::{GwctlError, Result};

pub mod http;

pub use http::{GatewayClient, GatewayClientConfig};

/// Admin API paths
pub mod paths {
    pub const CONFIG: &str = "/config";
    pub const CONFIG_BINDS: &str = "/config/binds";
    pub const LISTENERS: &str = "/listeners";
    pub const RBAC: &str = "/rbac";
    pub const TARGETS: &str = "/targets";
}

/// Request functions against the gateway admin API
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Full configuration document: source discriminator and binds
    async fn fetch_config(&self) -> Result<ConfigDocument>;

    /// Binds only
    async fn fetch_binds(&self) -> Result<Vec<Bind>> {
        Ok(self.fetch_config().await?.binds)
    }

    /// Listeners; a single listener object is normalized to a one-element list
    async fn fetch_listeners(&self) -> Result<Vec<Listener>>;

    async fn fetch_mcp_targets(&self) -> Result<Vec<Target>>;

    async fn fetch_a2a_targets(&self) -> Result<Vec<Target>>;

    /// Targets of one collection
    async fn fetch_targets(&self, target_type: TargetType) -> Result<Vec<Target>> {
        match target_type {
            TargetType::Mcp => self.fetch_mcp_targets().await,
            TargetType::A2a => self.fetch_a2a_targets().await,
        }
    }

    /// Replace every rule set attached to a listener
    async fn replace_rbac_policies(&self, listener: &str, policies: &[RuleSet]) -> Result<()>;

    /// Replace the whole bind tree
    async fn replace_binds(&self, binds: &[Bind]) -> Result<()>;

    /// Replace one target collection
    async fn replace_targets(&self, target_type: TargetType, targets: &[Target]) -> Result<()>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn malformed(endpoint: &str, message: String) -> GwctlError {
    warn!(endpoint, %message, "malformed response from gateway");
    GwctlError::malformed(endpoint, message)
}

/// Decode a JSON body, rejecting `null`
pub fn decode_body<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T> {
    if body.is_null() {
        return Err(malformed(endpoint, "expected a value, got null".to_string()));
    }
    serde_json::from_value(body).map_err(|e| malformed(endpoint, e.to_string()))
}

/// Decode a body that must be a JSON array
pub fn decode_collection<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<Vec<T>> {
    match body {
        Value::Array(_) => decode_body(endpoint, body),
        Value::Null => Err(malformed(endpoint, "expected a collection, got null".to_string())),
        other => Err(malformed(
            endpoint,
            format!("expected a collection, got {}", json_kind(&other)),
        )),
    }
}

/// Decode a body that is either an array or a single object
pub fn decode_one_or_many<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<Vec<T>> {
    match body {
        Value::Array(_) | Value::Object(_) => match decode_body(endpoint, body)? {
            OneOrMany::Many(items) => Ok(items),
            OneOrMany::One(item) => Ok(vec![item]),
        },
        Value::Null => Err(malformed(endpoint, "expected a collection, got null".to_string())),
        other => Err(malformed(
            endpoint,
            format!("expected a collection, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_listener_is_normalized() {
        let listeners: Vec<Listener> =
            decode_one_or_many(paths::LISTENERS, json!({"name": "only"})).unwrap();
        assert_eq!(listeners.len(), 1);
        assert_eq!(listeners[0].name.as_deref(), Some("only"));
    }

    #[test]
    fn listener_array_is_kept() {
        let listeners: Vec<Listener> =
            decode_one_or_many(paths::LISTENERS, json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn null_collection_is_malformed() {
        let err = decode_one_or_many::<Listener>(paths::LISTENERS, Value::Null).unwrap_err();
        assert!(matches!(err, GwctlError::MalformedResponse { .. }));

        let err = decode_collection::<Target>("/targets/mcp", Value::Null).unwrap_err();
        assert!(err.is_transport_like());
    }

    #[test]
    fn object_where_array_required_is_malformed() {
        let err = decode_collection::<Target>("/targets/a2a", json!({"name": "x"})).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn wrong_field_type_is_malformed() {
        let err =
            decode_body::<ConfigDocument>(paths::CONFIG, json!({"binds": "nope"})).unwrap_err();
        assert!(matches!(err, GwctlError::MalformedResponse { .. }));
    }
}
