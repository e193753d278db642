//! Derived views
//!
//! Pure functions over the configuration tree. They never mutate their
//! input and keep no state between calls.

pub mod aggregation;
pub mod classification;

pub use aggregation::{
    backend_stats, flatten_policies, listener_summary, policy_view, route_stats, target_stats,
    BackendStats, ListenerRef, ListenerSummary, PolicyView, RouteStats, TargetStats,
};
pub use classification::{
    ai_provider_name, classify_backend, classify_backend_value, classify_target, BackendKind,
    TargetKind,
};
