//! Domain layer
//!
//! Typed shape of the gateway configuration tree: binds, listeners, routes,
//! backends, RBAC rule sets and targets. These are plain serde types that
//! mirror the gateway's camelCase JSON wire format.
//!
//! ## Design Principles
//!
//! - **Kind resolved at the boundary**: backends and targets arrive as records
//!   where one optional sub-shape is populated. They are converted into closed
//!   enums while parsing, so downstream code matches exhaustively
//! - **Lossless round-trip**: unknown fields and unmodelled policies are kept
//!   and written back unchanged
//! - **Absent is not empty**: optional collections stay `Option<Vec<_>>` where
//!   the gateway distinguishes the two
//!
//! ## Module Organization
//!
//! - `bind`: binds, listeners, TLS and SSE blocks
//! - `route`: HTTP and TCP routes, matchers, JWT descriptor
//! - `backend`: backend shapes and the parsed [`Backend`]
//! - `policy`: RBAC rule sets and their evaluation
//! - `target`: MCP/A2A targets
//! - `configuration`: the configuration root

pub mod backend;
pub mod bind;
pub mod configuration;
pub mod policy;
pub mod route;
pub mod target;

pub use backend::{
    AiBackend, Backend, BackendTarget, DynamicBackend, McpBackend, RawBackend, ServiceBackend,
};
pub use bind::{Bind, Listener, ListenerProtocol, SseListener, TlsConfig, UNNAMED_LISTENER};
pub use configuration::{ConfigDocument, ConfigSource, Configuration};
pub use policy::{Matcher, Resource, ResourceType, Rule, RuleSet};
pub use route::{
    HeaderMatch, JwksSource, JwtAuth, PathMatch, QueryMatch, Route, RouteMatch, RoutePolicies,
    StringMatch, TcpRoute,
};
pub use target::{
    merge_target_collections, targets_of_type, OpenApiTarget, RawTarget, SseTarget, StdioTarget,
    Target, TargetSpec, TargetType,
};
