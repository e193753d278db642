//! # Business Rules Validation
//!
//! Structural rules over the configuration tree that the gateway accepts
//! but cannot serve correctly. Detection is advisory when reading; the store
//! uses [`ensure_listener_valid`] to refuse saving a listener that breaks them.

use serde::Serialize;

use crate::domain::{Bind, Listener};
use crate::errors::{GwctlError, Result};

/// A listener that has both HTTP routes and TCP routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidListener {
    pub bind_port: u16,
    pub listener_name: String,
}

fn has_conflicting_routes(listener: &Listener) -> bool {
    !listener.http_routes().is_empty() && !listener.tcp_routes().is_empty()
}

/// Listeners whose HTTP and TCP route collections are both non-empty, in
/// bind then listener order. Unnamed listeners are reported with the
/// placeholder name.
pub fn find_invalid_listeners(binds: &[Bind]) -> Vec<InvalidListener> {
    binds
        .iter()
        .flat_map(|bind| {
            bind.listeners.iter().filter(|l| has_conflicting_routes(l)).map(|listener| {
                InvalidListener {
                    bind_port: bind.port,
                    listener_name: listener.display_name().to_string(),
                }
            })
        })
        .collect()
}

/// Same as [`find_invalid_listeners`], limited to one bind
pub fn find_invalid_listeners_in(bind: &Bind) -> Vec<InvalidListener> {
    find_invalid_listeners(std::slice::from_ref(bind))
}

/// Reject a listener edit that would leave the listener with both route kinds
pub fn ensure_listener_valid(listener: &Listener) -> Result<()> {
    if has_conflicting_routes(listener) {
        return Err(GwctlError::validation_field(
            format!(
                "Listener '{}' cannot have both routes and tcpRoutes",
                listener.display_name()
            ),
            "tcpRoutes",
        ));
    }
    Ok(())
}
