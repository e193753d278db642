//! Bind and listener domain types
//!
//! A [`Bind`] is a listening port; its listeners are protocol endpoints that
//! own HTTP routes or TCP routes (never both in a valid configuration) and
//! may carry attached RBAC rule sets.

use serde::{Deserialize, Serialize};

use crate::domain::policy::RuleSet;
use crate::domain::route::{Route, TcpRoute};

/// Placeholder used wherever a listener without a name has to be reported
pub const UNNAMED_LISTENER: &str = "unnamed listener";

/// Listener protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListenerProtocol {
    #[default]
    Http,
    Https,
    Tls,
    Tcp,
    Hbone,
}

impl ListenerProtocol {
    /// Check if this protocol terminates TLS
    pub fn requires_tls(&self) -> bool {
        matches!(self, ListenerProtocol::Https | ListenerProtocol::Tls)
    }

    /// Check if this protocol carries HTTP routes
    pub fn is_http(&self) -> bool {
        matches!(self, ListenerProtocol::Http | ListenerProtocol::Https | ListenerProtocol::Hbone)
    }
}

/// Certificate and key path pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    pub cert: String,
    pub key: String,
}

/// Server-sent events block of a listener, carrying its RBAC attachments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SseListener {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub rbac: Vec<RuleSet>,
}

/// Protocol endpoint within a bind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listener {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default)]
    pub protocol: ListenerProtocol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse: Option<SseListener>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<Route>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_routes: Option<Vec<TcpRoute>>,
}

impl Listener {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_protocol(mut self, protocol: ListenerProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.get_or_insert_with(Vec::new).push(route);
        self
    }

    pub fn with_tcp_route(mut self, route: TcpRoute) -> Self {
        self.tcp_routes.get_or_insert_with(Vec::new).push(route);
        self
    }

    pub fn with_policy(mut self, rule_set: RuleSet) -> Self {
        self.sse.get_or_insert_with(SseListener::default).rbac.push(rule_set);
        self
    }

    /// Name used when reporting this listener
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED_LISTENER)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    pub fn http_routes(&self) -> &[Route] {
        self.routes.as_deref().unwrap_or(&[])
    }

    pub fn tcp_routes(&self) -> &[TcpRoute] {
        self.tcp_routes.as_deref().unwrap_or(&[])
    }

    pub fn has_routes(&self) -> bool {
        !self.http_routes().is_empty() || !self.tcp_routes().is_empty()
    }

    /// Attached RBAC rule sets, in attachment order
    pub fn policies(&self) -> &[RuleSet] {
        self.sse.as_ref().map(|sse| sse.rbac.as_slice()).unwrap_or(&[])
    }

    pub fn policies_mut(&mut self) -> &mut Vec<RuleSet> {
        &mut self.sse.get_or_insert_with(SseListener::default).rbac
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
            || self.protocol.requires_tls()
            || self.sse.as_ref().is_some_and(|sse| sse.tls.is_some())
    }
}

/// A listening port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bind {
    pub port: u16,
    #[serde(default)]
    pub listeners: Vec<Listener>,
}

impl Bind {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: Listener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn listener(&self, name: &str) -> Option<&Listener> {
        self.listeners.iter().find(|l| l.is_named(name))
    }
}
