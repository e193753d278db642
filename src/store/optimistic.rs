//! Two-phase optimistic updates
//!
//! A mutation captures the collection it edits before and after the edit.
//! The store installs the `after` copy (apply), issues the remote write and
//! then either drops the `before` copy (commit) or installs it again
//! (revert). Only the edited collection is swapped, so a concurrent change
//! to the other collection is never undone by a rollback.

use std::fmt;

use crate::domain::{targets_of_type, Bind, Configuration, RuleSet, Target, TargetType};

/// Independently locked parts of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Binds, listeners, routes and attached policies
    Listeners,
    /// MCP and A2A targets
    Targets,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Listeners => f.write_str("listeners"),
            Collection::Targets => f.write_str("targets"),
        }
    }
}

/// Contents of one collection
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CollectionState {
    Binds(Vec<Bind>),
    Targets(Vec<Target>),
}

impl CollectionState {
    pub(crate) fn capture(collection: Collection, configuration: &Configuration) -> Self {
        match collection {
            Collection::Listeners => CollectionState::Binds(configuration.binds.clone()),
            Collection::Targets => CollectionState::Targets(configuration.targets.clone()),
        }
    }

    pub(crate) fn collection(&self) -> Collection {
        match self {
            CollectionState::Binds(_) => Collection::Listeners,
            CollectionState::Targets(_) => Collection::Targets,
        }
    }

    /// Build the next configuration with this collection swapped in
    pub(crate) fn install(self, current: &Configuration) -> Configuration {
        let mut next = current.clone();
        match self {
            CollectionState::Binds(binds) => next.binds = binds,
            CollectionState::Targets(targets) => next.targets = targets,
        }
        next.version = current.version + 1;
        next.with_derived_policies()
    }
}

/// Remote write that makes an edit durable
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RemoteWrite {
    Rbac {
        listener: String,
        policies: Vec<RuleSet>,
    },
    Binds(Vec<Bind>),
    Targets {
        target_type: TargetType,
        targets: Vec<Target>,
    },
}

impl RemoteWrite {
    /// Full replacement of one target type taken from the edited collection
    pub(crate) fn targets(target_type: TargetType, all: &[Target]) -> Self {
        RemoteWrite::Targets {
            target_type,
            targets: targets_of_type(all, target_type),
        }
    }
}

/// Result of applying an edit closure to the current configuration
#[derive(Debug)]
pub(crate) struct Mutation {
    pub(crate) after: CollectionState,
    pub(crate) write: RemoteWrite,
}

impl Mutation {
    pub(crate) fn binds(binds: Vec<Bind>, write: RemoteWrite) -> Self {
        Self {
            after: CollectionState::Binds(binds),
            write,
        }
    }

    pub(crate) fn targets(targets: Vec<Target>, write: RemoteWrite) -> Self {
        Self {
            after: CollectionState::Targets(targets),
            write,
        }
    }
}

/// An applied but not yet settled edit
#[derive(Debug)]
pub(crate) struct OptimisticUpdate {
    operation: &'static str,
    before: CollectionState,
    after: CollectionState,
}

impl OptimisticUpdate {
    pub(crate) fn new(
        operation: &'static str,
        before: CollectionState,
        after: CollectionState,
    ) -> Self {
        debug_assert_eq!(before.collection(), after.collection());
        Self {
            operation,
            before,
            after,
        }
    }

    pub(crate) fn operation(&self) -> &'static str {
        self.operation
    }

    pub(crate) fn collection(&self) -> Collection {
        self.after.collection()
    }

    /// Copy of the edited collection to install now
    pub(crate) fn applied(&self) -> CollectionState {
        self.after.clone()
    }

    /// The write succeeded; the applied state stands
    pub(crate) fn commit(self) {}

    /// The write failed; returns the state to reinstall
    pub(crate) fn revert(self) -> CollectionState {
        self.before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Listener;

    fn configuration() -> Configuration {
        Configuration {
            binds: vec![Bind::new(3000).with_listener(Listener::new("a"))],
            targets: vec![Target::stdio("t", "echo", vec![]).with_type(TargetType::Mcp)],
            version: 4,
            ..Configuration::default()
        }
    }

    #[test]
    fn install_bumps_version_and_keeps_other_collection() {
        let current = configuration();
        let next = CollectionState::Binds(vec![]).install(&current);

        assert_eq!(next.version, 5);
        assert!(next.binds.is_empty());
        assert_eq!(next.targets, current.targets);
    }

    #[test]
    fn install_rederives_policies() {
        let current = configuration();
        let binds = vec![Bind::new(3000).with_listener(
            Listener::new("a").with_policy(RuleSet::new("p1", "default")),
        )];
        let next = CollectionState::Binds(binds).install(&current);
        assert_eq!(next.policies.len(), 1);
    }

    #[test]
    fn revert_returns_captured_state() {
        let current = configuration();
        let before = CollectionState::capture(Collection::Listeners, &current);
        let after = CollectionState::Binds(vec![]);
        let update = OptimisticUpdate::new("remove_listener", before.clone(), after);

        assert_eq!(update.collection(), Collection::Listeners);
        assert_eq!(update.applied(), CollectionState::Binds(vec![]));
        assert_eq!(update.revert(), before);
    }

    #[test]
    fn target_write_strips_tags() {
        let current = configuration();
        match RemoteWrite::targets(TargetType::Mcp, &current.targets) {
            RemoteWrite::Targets { target_type, targets } => {
                assert_eq!(target_type, TargetType::Mcp);
                assert_eq!(targets.len(), 1);
                assert_eq!(targets[0].target_type, None);
            }
            other => panic!("unexpected write {:?}", other),
        }
    }
}
