//! RBAC policy types
//!
//! A [`RuleSet`] is attached to a listener by inclusion in its `sse.rbac`
//! list. The same rule set name can be attached to several listeners; the
//! aggregation layer presents those attachments as one logical policy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of MCP resource a rule guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Tool,
    Prompt,
    Resource,
}

/// Resource reference; an `id` of `*` matches every resource of the type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub id: String,
}

impl Resource {
    pub const WILDCARD: &'static str = "*";

    pub fn tool<S: Into<String>>(id: S) -> Self {
        Self {
            resource_type: ResourceType::Tool,
            id: id.into(),
        }
    }

    /// Whether this rule resource covers the requested one
    pub fn matches(&self, requested: &Resource) -> bool {
        self.resource_type == requested.resource_type
            && (self.id == Self::WILDCARD || self.id == requested.id)
    }
}

/// Claim comparison. `equals` is the only matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Matcher {
    #[default]
    Equals,
}

/// A single claim condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub key: String,
    pub value: String,
    pub resource: Resource,
    #[serde(default)]
    pub matcher: Matcher,
}

impl Rule {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V, resource: Resource) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            resource,
            matcher: Matcher::Equals,
        }
    }

    fn claim_matches(&self, claims: &Map<String, Value>) -> bool {
        match (self.matcher, claims.get(&self.key)) {
            (Matcher::Equals, Some(Value::String(claim))) => claim == &self.value,
            (Matcher::Equals, Some(Value::Array(values))) => {
                values.iter().any(|v| v.as_str() == Some(self.value.as_str()))
            }
            (Matcher::Equals, Some(other @ (Value::Number(_) | Value::Bool(_)))) => {
                other.to_string() == self.value
            }
            _ => false,
        }
    }
}

/// Named RBAC rule set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, namespace: S) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluate JWT claims against a resource. A rule set without rules
    /// allows everything; otherwise one rule must cover the resource and
    /// match its claim.
    pub fn check(&self, claims: &Map<String, Value>, resource: &Resource) -> bool {
        if self.rules.is_empty() {
            return true;
        }
        self.rules.iter().any(|rule| rule.resource.matches(resource) && rule.claim_matches(claims))
    }
}
