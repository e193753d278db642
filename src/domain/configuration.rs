//! Configuration root
//!
//! [`Configuration`] is the whole tree the store owns. It is never mutated
//! while shared: the store builds a new value and swaps the `Arc`.

use serde::{Deserialize, Serialize};

use crate::domain::bind::{Bind, Listener};
use crate::domain::policy::RuleSet;
use crate::domain::target::Target;
use crate::services::aggregation::flatten_policies;

/// Where the remote gateway's configuration comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Local file owned by the gateway; editable through this client
    #[default]
    Static,
    /// Pushed by an external control plane; read-only here
    #[serde(alias = "external")]
    Xds,
}

impl ConfigSource {
    pub fn is_read_only(&self) -> bool {
        matches!(self, ConfigSource::Xds)
    }
}

/// Response of `GET /config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(rename = "type", default)]
    pub source: ConfigSource,
    #[serde(default)]
    pub binds: Vec<Bind>,
}

/// In-memory configuration tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(rename = "type", default)]
    pub source: ConfigSource,
    #[serde(default)]
    pub binds: Vec<Bind>,
    #[serde(default)]
    pub targets: Vec<Target>,
    /// Flattened from listener attachments; recomputed on every swap
    #[serde(default)]
    pub policies: Vec<RuleSet>,
    #[serde(default)]
    pub version: u64,
}

impl Configuration {
    /// Recompute the derived policy list from the current binds
    pub fn with_derived_policies(mut self) -> Self {
        self.policies = flatten_policies(&self.binds);
        self
    }

    /// Every listener in bind order
    pub fn listeners(&self) -> impl Iterator<Item = &Listener> {
        self.binds.iter().flat_map(|bind| bind.listeners.iter())
    }

    pub fn find_listener(&self, name: &str) -> Option<&Listener> {
        self.listeners().find(|l| l.is_named(name))
    }

    pub fn find_listener_mut(&mut self, name: &str) -> Option<&mut Listener> {
        self.binds
            .iter_mut()
            .flat_map(|bind| bind.listeners.iter_mut())
            .find(|l| l.is_named(name))
    }

    pub fn is_read_only(&self) -> bool {
        self.source.is_read_only()
    }
}
