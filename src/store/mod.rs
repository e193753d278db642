//! # Configuration Store
//!
//! [`ConfigStore`] owns the in-memory copy of the gateway configuration and
//! keeps it in sync with the remote gateway through a [`GatewayApi`].
//!
//! ## Lifecycle
//!
//! `Uninitialized → Loading → {Connected, Error}`. The initial load runs once
//! when the store is connected. After that a new loading cycle is entered
//! only by an explicit refresh or a mutation; nothing is retried on a timer.
//! Errors are tracked per [`Collection`]: the store is `Connected` when no
//! collection has an outstanding error.
//!
//! ## Concurrency
//!
//! The configuration is copy-on-write: readers get an `Arc<Configuration>`
//! snapshot that never changes, and every update swaps in a new tree with a
//! higher version. Operations on the same collection are serialized by a
//! per-collection async mutex; listeners and targets proceed independently.
//! Loads and mutations run in spawned tasks, so dropping the caller's future
//! never leaves an optimistic update half-settled.
//!
//! ## Mutations
//!
//! Every mutation applies its edit locally, writes it to the gateway and
//! then commits (keeps the local state, no re-fetch) or reverts to the
//! pre-mutation collection and returns [`GwctlError::OptimisticRollback`].
//! Externally managed configurations reject mutations with
//! [`GwctlError::ReadOnly`] before any request is made.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn, Instrument};

use crate::client::GatewayApi;
use crate::domain::{
    merge_target_collections, Backend, Bind, ConfigSource, Configuration, Listener, Route,
    RuleSet, Target, TargetType,
};
use crate::errors::{GwctlError, Result};
use crate::services::aggregation::{
    backend_stats, listener_summary, policy_view, route_stats, target_stats, BackendStats,
    ListenerSummary, PolicyView, RouteStats, TargetStats,
};
use crate::validation::{
    ensure_listener_valid, find_invalid_listeners, validate_request, InvalidListener,
};

pub mod cache;
mod optimistic;

pub use cache::{ConfigCache, FileConfigCache, MemoryConfigCache, CACHE_KEY};
pub use optimistic::Collection;

use optimistic::{CollectionState, Mutation, OptimisticUpdate, RemoteWrite};

/// Lifecycle state of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreState {
    Uninitialized,
    Loading,
    Connected,
    Error,
}

/// Point-in-time view of the store's state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStatus {
    pub state: StoreState,
    pub connected: bool,
    pub read_only: bool,
    pub source: ConfigSource,
    /// Human readable summary of every outstanding collection error
    pub connection_error: Option<String>,
    pub collection_errors: BTreeMap<String, String>,
    pub last_synced: Option<DateTime<Utc>>,
    pub version: u64,
}

#[derive(Debug, Default)]
struct StoreData {
    configuration: Arc<Configuration>,
    initialized: bool,
    in_flight: usize,
    errors: BTreeMap<Collection, String>,
    last_synced: Option<DateTime<Utc>>,
}

impl StoreData {
    fn state(&self) -> StoreState {
        if self.in_flight > 0 {
            StoreState::Loading
        } else if !self.initialized {
            StoreState::Uninitialized
        } else if self.errors.is_empty() {
            StoreState::Connected
        } else {
            StoreState::Error
        }
    }

    fn is_connected(&self) -> bool {
        self.initialized && self.errors.is_empty()
    }

    fn connection_error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.values().cloned().collect::<Vec<_>>().join("; "))
        }
    }

    fn install(&mut self, state: CollectionState) {
        let next = state.install(&self.configuration);
        self.configuration = Arc::new(next);
    }
}

struct StoreInner {
    api: Arc<dyn GatewayApi>,
    cache: Option<Arc<dyn ConfigCache>>,
    data: RwLock<StoreData>,
    listeners_lock: Mutex<()>,
    targets_lock: Mutex<()>,
}

/// Marks an operation in flight for the lifetime of the guard
struct LoadingGuard {
    inner: Arc<StoreInner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let mut data = self.inner.data.write().unwrap_or_else(PoisonError::into_inner);
        data.in_flight = data.in_flight.saturating_sub(1);
    }
}

/// Builder for [`ConfigStore`]
pub struct ConfigStoreBuilder {
    api: Arc<dyn GatewayApi>,
    cache: Option<Arc<dyn ConfigCache>>,
}

impl ConfigStoreBuilder {
    /// Cache the last-applied configuration in the given slot
    pub fn cache(mut self, cache: Arc<dyn ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Build an uninitialized store without loading
    pub fn build(self) -> ConfigStore {
        ConfigStore {
            inner: Arc::new(StoreInner {
                api: self.api,
                cache: self.cache,
                data: RwLock::new(StoreData::default()),
                listeners_lock: Mutex::new(()),
                targets_lock: Mutex::new(()),
            }),
        }
    }

    /// Build the store and perform the initial load. A failed load leaves
    /// the store in the `Error` state; it is not returned as an error.
    pub async fn connect(self) -> ConfigStore {
        let store = self.build();
        if let Err(e) = store.load().await {
            warn!(error = %e, "initial configuration load failed");
        }
        store
    }
}

/// Shared handle to the configuration store. Clones share state.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore").field("status", &self.status()).finish()
    }
}

impl ConfigStore {
    pub fn builder(api: Arc<dyn GatewayApi>) -> ConfigStoreBuilder {
        ConfigStoreBuilder { api, cache: None }
    }

    /// Create a store and perform the initial load
    pub async fn connect(api: Arc<dyn GatewayApi>) -> Self {
        Self::builder(api).connect().await
    }

    // === State access ===

    fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.inner.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<R>(&self, f: impl FnOnce(&mut StoreData) -> R) -> R {
        let mut data = self.inner.data.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut data)
    }

    /// Current configuration; never changes after it is returned
    pub fn snapshot(&self) -> Arc<Configuration> {
        Arc::clone(&self.read().configuration)
    }

    pub fn state(&self) -> StoreState {
        self.read().state()
    }

    pub fn is_connected(&self) -> bool {
        self.read().is_connected()
    }

    /// True when the gateway reports an externally managed configuration
    pub fn is_read_only(&self) -> bool {
        self.read().configuration.is_read_only()
    }

    pub fn connection_error(&self) -> Option<String> {
        self.read().connection_error()
    }

    /// Outstanding error for one collection
    pub fn collection_error(&self, collection: Collection) -> Option<String> {
        self.read().errors.get(&collection).cloned()
    }

    pub fn status(&self) -> StoreStatus {
        let data = self.read();
        StoreStatus {
            state: data.state(),
            connected: data.is_connected(),
            read_only: data.configuration.is_read_only(),
            source: data.configuration.source,
            connection_error: data.connection_error(),
            collection_errors: data
                .errors
                .iter()
                .map(|(collection, message)| (collection.to_string(), message.clone()))
                .collect(),
            last_synced: data.last_synced,
            version: data.configuration.version,
        }
    }

    // === Derived views, recomputed on every call ===

    pub fn binds(&self) -> Vec<Bind> {
        self.snapshot().binds.clone()
    }

    pub fn targets(&self) -> Vec<Target> {
        self.snapshot().targets.clone()
    }

    /// Deduplicated rule sets attached to any listener
    pub fn policies(&self) -> Vec<RuleSet> {
        self.snapshot().policies.clone()
    }

    pub fn backend_stats(&self) -> BackendStats {
        backend_stats(&self.snapshot().binds)
    }

    pub fn route_stats(&self) -> RouteStats {
        route_stats(&self.snapshot().binds)
    }

    pub fn policy_view(&self) -> BTreeMap<String, PolicyView> {
        policy_view(&self.snapshot().binds)
    }

    pub fn listener_summary(&self) -> ListenerSummary {
        listener_summary(&self.snapshot().binds)
    }

    pub fn target_stats(&self) -> TargetStats {
        target_stats(&self.snapshot().targets)
    }

    /// Listeners violating HTTP/TCP route exclusivity; advisory only
    pub fn invalid_listeners(&self) -> Vec<InvalidListener> {
        find_invalid_listeners(&self.snapshot().binds)
    }

    /// Last configuration written to the cache, if any. A hint only: it is
    /// never installed as store state.
    pub fn cached_configuration(&self) -> Option<Configuration> {
        let cache = self.inner.cache.as_ref()?;
        match cache.read(CACHE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(configuration) => Some(configuration),
                Err(e) => {
                    warn!(error = %e, "ignoring unreadable configuration cache");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read configuration cache");
                None
            }
        }
    }

    // === Internal helpers ===

    fn begin_loading(&self) -> LoadingGuard {
        self.update(|data| data.in_flight += 1);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        match collection {
            Collection::Listeners => self.inner.listeners_lock.lock().await,
            Collection::Targets => self.inner.targets_lock.lock().await,
        }
    }

    fn record_error(&self, collection: Collection, error: &GwctlError) {
        warn!(collection = %collection, error = %error, "gateway request failed");
        let message = error.banner_message();
        self.update(|data| {
            data.initialized = true;
            data.errors.insert(collection, message);
        });
    }

    /// Persist the current configuration while connected
    fn write_cache(&self) {
        let Some(cache) = self.inner.cache.as_ref() else {
            return;
        };
        let (connected, configuration) = {
            let data = self.read();
            (data.is_connected(), Arc::clone(&data.configuration))
        };
        if !connected {
            debug!("not connected; skipping configuration cache write");
            return;
        }

        let result = serde_json::to_string(configuration.as_ref())
            .map_err(GwctlError::from)
            .and_then(|raw| cache.write(CACHE_KEY, &raw));
        if let Err(e) = result {
            warn!(error = %e, "failed to write configuration cache");
        }
    }

    /// Run an operation to completion on the runtime, independent of the caller
    async fn spawn<F, Fut>(&self, operation: &'static str, run: F) -> Result<()>
    where
        F: FnOnce(ConfigStore) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let span = crate::store_span!(operation);
        tokio::spawn(run(self.clone()).instrument(span)).await?
    }

    // === Loading ===

    /// Fetch the configuration and both target collections and swap them in
    /// atomically. On failure the previous configuration is kept, each failed
    /// fetch records an error against its collection and earlier errors stay.
    pub async fn load(&self) -> Result<()> {
        self.spawn("load", |store| async move { store.run_load().await }).await
    }

    async fn run_load(&self) -> Result<()> {
        let _listeners = self.lock(Collection::Listeners).await;
        let _targets = self.lock(Collection::Targets).await;
        let _loading = self.begin_loading();
        info!("loading gateway configuration");

        let api = &self.inner.api;
        let (config, mcp, a2a) =
            tokio::join!(api.fetch_config(), api.fetch_mcp_targets(), api.fetch_a2a_targets());
        let targets = match (mcp, a2a) {
            (Ok(mcp), Ok(a2a)) => Ok(merge_target_collections(mcp, a2a)),
            (Err(e), _) | (_, Err(e)) => Err(e),
        };

        match (config, targets) {
            (Ok(document), Ok(targets)) => {
                let configuration = self.update(|data| {
                    let next = Configuration {
                        source: document.source,
                        binds: document.binds,
                        targets,
                        policies: Vec::new(),
                        version: data.configuration.version + 1,
                    }
                    .with_derived_policies();
                    data.configuration = Arc::new(next);
                    data.errors.clear();
                    data.initialized = true;
                    data.last_synced = Some(Utc::now());
                    Arc::clone(&data.configuration)
                });
                info!(
                    version = configuration.version,
                    binds = configuration.binds.len(),
                    targets = configuration.targets.len(),
                    read_only = configuration.is_read_only(),
                    "connected to gateway"
                );
                self.write_cache();
                Ok(())
            }
            (config, targets) => {
                // Nothing was installed, so errors from earlier operations stand
                self.update(|data| data.initialized = true);
                let mut first = None;
                if let Err(e) = config {
                    self.record_error(Collection::Listeners, &e);
                    first.get_or_insert(e);
                }
                if let Err(e) = targets {
                    self.record_error(Collection::Targets, &e);
                    first.get_or_insert(e);
                }
                Err(first.unwrap_or_else(|| GwctlError::internal("configuration load failed")))
            }
        }
    }

    /// Re-fetch binds and the configuration source only
    pub async fn refresh_listeners(&self) -> Result<()> {
        self.spawn("refresh_listeners", |store| async move { store.run_refresh_listeners().await })
            .await
    }

    async fn run_refresh_listeners(&self) -> Result<()> {
        let _guard = self.lock(Collection::Listeners).await;
        let _loading = self.begin_loading();

        match self.inner.api.fetch_config().await {
            Ok(document) => {
                self.update(|data| {
                    let mut next =
                        CollectionState::Binds(document.binds).install(&data.configuration);
                    next.source = document.source;
                    data.configuration = Arc::new(next);
                    data.errors.remove(&Collection::Listeners);
                    data.initialized = true;
                    data.last_synced = Some(Utc::now());
                });
                info!(collection = %Collection::Listeners, "refreshed");
                self.write_cache();
                Ok(())
            }
            Err(e) => {
                self.record_error(Collection::Listeners, &e);
                Err(e)
            }
        }
    }

    /// Re-fetch both target collections only
    pub async fn refresh_targets(&self) -> Result<()> {
        self.spawn("refresh_targets", |store| async move { store.run_refresh_targets().await })
            .await
    }

    async fn run_refresh_targets(&self) -> Result<()> {
        let _guard = self.lock(Collection::Targets).await;
        let _loading = self.begin_loading();

        let api = &self.inner.api;
        let (mcp, a2a) = tokio::join!(api.fetch_mcp_targets(), api.fetch_a2a_targets());
        match (mcp, a2a) {
            (Ok(mcp), Ok(a2a)) => {
                let targets = merge_target_collections(mcp, a2a);
                self.update(|data| {
                    data.install(CollectionState::Targets(targets));
                    data.errors.remove(&Collection::Targets);
                    data.initialized = true;
                    data.last_synced = Some(Utc::now());
                });
                info!(collection = %Collection::Targets, "refreshed");
                self.write_cache();
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => {
                self.record_error(Collection::Targets, &e);
                Err(e)
            }
        }
    }

    // === Mutations ===

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.is_read_only() {
            warn!(operation, "rejected: configuration is externally managed");
            return Err(GwctlError::read_only(operation));
        }
        Ok(())
    }

    async fn mutate<F>(
        &self,
        collection: Collection,
        operation: &'static str,
        edit: F,
    ) -> Result<()>
    where
        F: FnOnce(&Configuration) -> Result<Mutation> + Send + 'static,
    {
        self.ensure_writable(operation)?;
        self.spawn(operation, move |store| async move {
            store.run_mutation(collection, operation, edit).await
        })
        .await
    }

    async fn run_mutation<F>(
        &self,
        collection: Collection,
        operation: &'static str,
        edit: F,
    ) -> Result<()>
    where
        F: FnOnce(&Configuration) -> Result<Mutation>,
    {
        let _guard = self.lock(collection).await;

        let current = self.snapshot();
        if current.is_read_only() {
            return Err(GwctlError::read_only(operation));
        }
        let before = CollectionState::capture(collection, &current);
        let Mutation { after, write } = edit(&current)?;
        let _loading = self.begin_loading();

        let update = OptimisticUpdate::new(operation, before, after);
        self.update(|data| data.install(update.applied()));
        debug!(
            operation = update.operation(),
            collection = %update.collection(),
            "applied optimistic update"
        );

        match self.write_remote(write).await {
            Ok(()) => {
                update.commit();
                // A completed round trip proves the collection is reachable again
                self.update(|data| {
                    data.errors.remove(&collection);
                    data.last_synced = Some(Utc::now());
                });
                info!(operation, "committed");
                self.write_cache();
                Ok(())
            }
            Err(error) => {
                warn!(operation, error = %error, "remote write failed; rolling back");
                self.update(|data| data.install(update.revert()));
                if error.is_transport_like() {
                    self.record_error(collection, &error);
                }
                Err(GwctlError::rollback(operation, error))
            }
        }
    }

    async fn write_remote(&self, write: RemoteWrite) -> Result<()> {
        let api = &self.inner.api;
        match write {
            RemoteWrite::Rbac { listener, policies } => {
                api.replace_rbac_policies(&listener, &policies).await
            }
            RemoteWrite::Binds(binds) => api.replace_binds(&binds).await,
            RemoteWrite::Targets { target_type, targets } => {
                api.replace_targets(target_type, &targets).await
            }
        }
    }

    /// Attach a rule set to a listener
    pub async fn add_policy(&self, listener: &str, rule_set: RuleSet) -> Result<()> {
        self.ensure_writable("add_policy")?;
        validate_request(&rule_set)?;
        let listener = listener.to_string();

        self.mutate(Collection::Listeners, "add_policy", move |current| {
            let mut binds = current.binds.clone();
            let target = listener_mut(&mut binds, &listener)?;
            if target.policies().iter().any(|p| p.name == rule_set.name) {
                return Err(GwctlError::conflict(
                    format!("Policy '{}' is already attached to '{}'", rule_set.name, listener),
                    "policy",
                ));
            }
            target.policies_mut().push(rule_set);
            let policies = target.policies().to_vec();
            Ok(Mutation::binds(binds, RemoteWrite::Rbac { listener, policies }))
        })
        .await
    }

    /// Detach a rule set from a listener
    pub async fn remove_policy(&self, listener: &str, policy_name: &str) -> Result<()> {
        self.ensure_writable("remove_policy")?;
        let listener = listener.to_string();
        let policy_name = policy_name.to_string();

        self.mutate(Collection::Listeners, "remove_policy", move |current| {
            let mut binds = current.binds.clone();
            let target = listener_mut(&mut binds, &listener)?;
            let policies = target.policies_mut();
            let index = policies
                .iter()
                .position(|p| p.name == policy_name)
                .ok_or_else(|| GwctlError::not_found("policy", policy_name.as_str()))?;
            policies.remove(index);
            let policies = policies.clone();
            Ok(Mutation::binds(binds, RemoteWrite::Rbac { listener, policies }))
        })
        .await
    }

    /// Add a listener to a bind, or replace the one with the same name.
    /// The bind is created when no bind uses the port yet.
    pub async fn upsert_listener(&self, bind_port: u16, listener: Listener) -> Result<()> {
        self.ensure_writable("upsert_listener")?;
        validate_request(&listener)?;
        ensure_listener_valid(&listener)?;

        self.mutate(Collection::Listeners, "upsert_listener", move |current| {
            let mut binds = current.binds.clone();
            let name = listener.display_name().to_string();
            let index = match binds.iter().position(|b| b.port == bind_port) {
                Some(index) => index,
                None => {
                    binds.push(Bind::new(bind_port));
                    binds.len() - 1
                }
            };
            let bind = &mut binds[index];
            match bind.listeners.iter_mut().find(|l| l.is_named(&name)) {
                Some(existing) => *existing = listener,
                None => bind.listeners.push(listener),
            }
            let write = RemoteWrite::Binds(binds.clone());
            Ok(Mutation::binds(binds, write))
        })
        .await
    }

    /// Remove a listener from whichever bind holds it
    pub async fn remove_listener(&self, listener: &str) -> Result<()> {
        self.ensure_writable("remove_listener")?;
        let listener = listener.to_string();

        self.mutate(Collection::Listeners, "remove_listener", move |current| {
            let mut binds = current.binds.clone();
            let removed = binds.iter_mut().any(|bind| {
                match bind.listeners.iter().position(|l| l.is_named(&listener)) {
                    Some(index) => {
                        bind.listeners.remove(index);
                        true
                    }
                    None => false,
                }
            });
            if !removed {
                return Err(GwctlError::not_found("listener", listener.as_str()));
            }
            let write = RemoteWrite::Binds(binds.clone());
            Ok(Mutation::binds(binds, write))
        })
        .await
    }

    /// Add an HTTP route to a listener, or replace the one with the same name.
    /// Rejected when the listener already has TCP routes.
    pub async fn upsert_route(&self, listener: &str, route: Route) -> Result<()> {
        self.ensure_writable("upsert_route")?;
        let route_name = route
            .name
            .clone()
            .ok_or_else(|| GwctlError::validation_field("Route name is required", "name"))?;
        validate_request(&route)?;
        let listener = listener.to_string();

        self.mutate(Collection::Listeners, "upsert_route", move |current| {
            let mut binds = current.binds.clone();
            let target = listener_mut(&mut binds, &listener)?;
            let routes = target.routes.get_or_insert_with(Vec::new);
            match routes.iter_mut().find(|r| r.is_named(&route_name)) {
                Some(existing) => *existing = route,
                None => routes.push(route),
            }
            ensure_listener_valid(target)?;
            let write = RemoteWrite::Binds(binds.clone());
            Ok(Mutation::binds(binds, write))
        })
        .await
    }

    /// Remove an HTTP route from a listener
    pub async fn remove_route(&self, listener: &str, route_name: &str) -> Result<()> {
        self.ensure_writable("remove_route")?;
        let listener = listener.to_string();
        let route_name = route_name.to_string();

        self.mutate(Collection::Listeners, "remove_route", move |current| {
            let mut binds = current.binds.clone();
            let target = listener_mut(&mut binds, &listener)?;
            let routes = target.routes.get_or_insert_with(Vec::new);
            let index = routes
                .iter()
                .position(|r| r.is_named(&route_name))
                .ok_or_else(|| GwctlError::not_found("route", route_name.as_str()))?;
            routes.remove(index);
            let write = RemoteWrite::Binds(binds.clone());
            Ok(Mutation::binds(binds, write))
        })
        .await
    }

    /// Replace the backends of an HTTP route
    pub async fn set_route_backends(
        &self,
        listener: &str,
        route_name: &str,
        backends: Vec<Backend>,
    ) -> Result<()> {
        self.ensure_writable("set_route_backends")?;
        for backend in &backends {
            validate_request(backend)?;
        }
        let listener = listener.to_string();
        let route_name = route_name.to_string();

        self.mutate(Collection::Listeners, "set_route_backends", move |current| {
            let mut binds = current.binds.clone();
            let target = listener_mut(&mut binds, &listener)?;
            let route = target
                .routes
                .as_mut()
                .and_then(|routes| routes.iter_mut().find(|r| r.is_named(&route_name)))
                .ok_or_else(|| GwctlError::not_found("route", route_name.as_str()))?;
            route.backends = backends;
            let write = RemoteWrite::Binds(binds.clone());
            Ok(Mutation::binds(binds, write))
        })
        .await
    }

    /// Add a target to one collection
    pub async fn add_target(&self, target_type: TargetType, target: Target) -> Result<()> {
        self.ensure_writable("add_target")?;
        validate_request(&target)?;

        self.mutate(Collection::Targets, "add_target", move |current| {
            let mut targets = current.targets.clone();
            if targets.iter().any(|t| t.target_type == Some(target_type) && t.name == target.name) {
                return Err(GwctlError::conflict(
                    format!("{} target '{}' already exists", target_type, target.name),
                    "target",
                ));
            }
            targets.push(target.with_type(target_type));
            let write = RemoteWrite::targets(target_type, &targets);
            Ok(Mutation::targets(targets, write))
        })
        .await
    }

    /// Remove a target from one collection
    pub async fn remove_target(&self, target_type: TargetType, name: &str) -> Result<()> {
        self.ensure_writable("remove_target")?;
        let name = name.to_string();

        self.mutate(Collection::Targets, "remove_target", move |current| {
            let mut targets = current.targets.clone();
            let index = targets
                .iter()
                .position(|t| t.target_type == Some(target_type) && t.name == name)
                .ok_or_else(|| {
                    GwctlError::not_found(format!("{} target", target_type), name.as_str())
                })?;
            targets.remove(index);
            let write = RemoteWrite::targets(target_type, &targets);
            Ok(Mutation::targets(targets, write))
        })
        .await
    }
}

fn listener_mut<'a>(binds: &'a mut [Bind], name: &str) -> Result<&'a mut Listener> {
    binds
        .iter_mut()
        .flat_map(|bind| bind.listeners.iter_mut())
        .find(|l| l.is_named(name))
        .ok_or_else(|| GwctlError::not_found("listener", name))
}
