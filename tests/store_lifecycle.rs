//! Configuration store lifecycle: loading, scoped refresh, optimistic
//! mutations, read-only mode and the configuration cache.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{
    backend_scenario_binds, rule_set, sample_binds, sample_targets, wire_configuration,
    MockGatewayApi,
};
use gwctl::domain::{
    Backend, Bind, ConfigDocument, ConfigSource, Configuration, Listener, Route, Target,
    TargetType,
};
use gwctl::errors::GwctlError;
use gwctl::store::{Collection, ConfigCache, ConfigStore, MemoryConfigCache, StoreState, CACHE_KEY};

async fn connected(api: Arc<MockGatewayApi>) -> ConfigStore {
    let store = ConfigStore::connect(api).await;
    assert_eq!(store.state(), StoreState::Connected);
    store
}

fn sample_api() -> Arc<MockGatewayApi> {
    let (mcp, a2a) = sample_targets();
    MockGatewayApi::with_binds(sample_binds()).with_targets(mcp, a2a).shared()
}

fn policy_names(store: &ConfigStore, listener: &str) -> Vec<String> {
    store
        .snapshot()
        .find_listener(listener)
        .map(|l| l.policies().iter().map(|p| p.name.clone()).collect())
        .unwrap_or_default()
}

// === Loading ===

#[tokio::test]
async fn builder_store_starts_uninitialized() {
    let store = ConfigStore::builder(sample_api()).build();
    assert_eq!(store.state(), StoreState::Uninitialized);
    assert!(!store.is_connected());
    assert_eq!(store.snapshot().version, 0);
}

#[tokio::test]
async fn connect_loads_every_collection() {
    let store = connected(sample_api()).await;
    let snapshot = store.snapshot();

    assert_eq!(snapshot.binds.len(), 2);
    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.targets.len(), 2);
    assert_eq!(snapshot.targets[0].target_type, Some(TargetType::Mcp));
    assert_eq!(snapshot.targets[1].target_type, Some(TargetType::A2a));

    // p1 is attached to both a and b but listed once
    assert_eq!(store.policies().len(), 1);
    let view = store.policy_view();
    assert_eq!(view["p1"].listener_names, vec!["a".to_string(), "b".to_string()]);

    let status = store.status();
    assert!(status.connected);
    assert!(!status.read_only);
    assert!(status.connection_error.is_none());
    assert!(status.last_synced.is_some());
}

#[tokio::test]
async fn fetch_failure_enters_error_and_keeps_listeners() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    let before = store.snapshot();

    api.fail_config(true);
    let err = store.load().await.unwrap_err();

    assert!(err.is_transport_like());
    assert_eq!(store.state(), StoreState::Error);
    assert!(store.connection_error().is_some());
    assert_eq!(store.snapshot().binds, before.binds);
    assert_eq!(store.snapshot().version, before.version);
}

#[tokio::test]
async fn initial_load_failure_keeps_empty_configuration() {
    let api = sample_api();
    api.fail_config(true);

    let store = ConfigStore::connect(api).await;

    assert_eq!(store.state(), StoreState::Error);
    assert!(store.snapshot().binds.is_empty());
    assert!(store.collection_error(Collection::Listeners).is_some());
    assert!(store.collection_error(Collection::Targets).is_none());
}

#[tokio::test]
async fn failed_load_keeps_earlier_target_error() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    api.fail_targets(true);
    assert!(store.refresh_targets().await.is_err());

    // targets are reachable again but the load fails on config, so the
    // fetched targets are discarded and the old list is still served
    api.fail_targets(false);
    api.fail_config(true);
    assert!(store.load().await.is_err());

    assert!(store.collection_error(Collection::Listeners).is_some());
    assert!(store.collection_error(Collection::Targets).is_some());

    api.fail_config(false);
    store.load().await.unwrap();
    assert_eq!(store.state(), StoreState::Connected);
}

#[tokio::test]
async fn partially_filled_backend_loads_as_unknown() {
    let document: ConfigDocument = serde_json::from_value(serde_json::json!({
        "type": "static",
        "binds": [{
            "port": 3000,
            "listeners": [{
                "name": "l1",
                "routes": [{
                    "name": "r1",
                    "backends": [
                        {"host": "a:80"},
                        {"service": {"name": "default/svc"}}
                    ]
                }]
            }]
        }]
    }))
    .unwrap();
    let store = connected(MockGatewayApi::new(document).shared()).await;

    let stats = store.backend_stats();
    assert_eq!(stats.total_backends, 2);
    assert_eq!(stats.unknown_backends, 1);
}

#[tokio::test]
async fn reload_after_failure_reconnects() {
    let api = sample_api();
    api.fail_targets(true);
    let store = ConfigStore::connect(api.clone()).await;
    assert_eq!(store.state(), StoreState::Error);

    api.fail_targets(false);
    store.load().await.unwrap();
    assert_eq!(store.state(), StoreState::Connected);
    assert_eq!(store.snapshot().targets.len(), 2);
}

#[tokio::test]
async fn loads_never_block_on_invalid_listeners() {
    let binds = vec![Bind::new(8080).with_listener(
        Listener::new("mixed")
            .with_route(Route::new("r1"))
            .with_tcp_route(Default::default()),
    )];
    let store = connected(MockGatewayApi::with_binds(binds).shared()).await;

    let invalid = store.invalid_listeners();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].bind_port, 8080);
    assert_eq!(invalid[0].listener_name, "mixed");
}

#[tokio::test]
async fn backend_statistics_scenario() {
    let store = connected(MockGatewayApi::with_binds(backend_scenario_binds()).shared()).await;
    let stats = store.backend_stats();

    assert_eq!(stats.total_backends, 3);
    assert_eq!(stats.host_backends, 1);
    assert_eq!(stats.mcp_backends, 2);
    assert_eq!(stats.binds_with_backends, 1);
}

// === Scoped refresh ===

#[tokio::test]
async fn scoped_refresh_failure_keeps_other_collection() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    let binds = store.binds();

    api.fail_targets(true);
    assert!(store.refresh_targets().await.is_err());

    assert_eq!(store.state(), StoreState::Error);
    assert!(store.collection_error(Collection::Targets).is_some());
    assert!(store.collection_error(Collection::Listeners).is_none());
    assert_eq!(store.targets().len(), 2);
    assert_eq!(store.binds(), binds);

    // A listener refresh does not clear the target error
    store.refresh_listeners().await.unwrap();
    assert_eq!(store.state(), StoreState::Error);

    api.fail_targets(false);
    store.refresh_targets().await.unwrap();
    assert_eq!(store.state(), StoreState::Connected);
}

#[tokio::test]
async fn refresh_listeners_picks_up_source_change() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    assert!(!store.is_read_only());

    api.set_source(ConfigSource::Xds);
    store.refresh_listeners().await.unwrap();

    assert!(store.is_read_only());
    assert_eq!(store.targets().len(), 2);
}

// === Read-only mode ===

#[tokio::test]
async fn read_only_mutations_make_no_calls() {
    let api = MockGatewayApi::new(ConfigDocument {
        source: ConfigSource::Xds,
        binds: sample_binds(),
    })
    .shared();
    let store = connected(api.clone()).await;
    assert!(store.is_read_only());
    let calls = api.calls();

    let err = store.add_policy("a", rule_set("p2")).await.unwrap_err();
    assert!(matches!(err, GwctlError::ReadOnly { .. }));

    let err = store.upsert_listener(8080, Listener::new("c")).await.unwrap_err();
    assert!(matches!(err, GwctlError::ReadOnly { .. }));

    let err = store
        .add_target(TargetType::Mcp, Target::stdio("t", "echo", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, GwctlError::ReadOnly { .. }));

    assert_eq!(api.calls(), calls);
    assert_eq!(policy_names(&store, "a"), vec!["p1"]);
}

// === Optimistic mutations ===

#[tokio::test]
async fn add_policy_commits_without_refetch() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    let calls = api.calls();
    let version = store.snapshot().version;

    store.add_policy("a", rule_set("p2")).await.unwrap();

    assert_eq!(api.calls(), calls + 1);
    assert_eq!(policy_names(&store, "a"), vec!["p1", "p2"]);
    assert!(store.snapshot().version > version);
    assert_eq!(store.policies().len(), 2);

    let writes = api.rbac_writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, "a");
    assert_eq!(writes[0].1.len(), 2);
}

#[tokio::test]
async fn failing_write_rolls_back_policy() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    api.fail_writes(true);
    let err = store.add_policy("a", rule_set("p2")).await.unwrap_err();

    match &err {
        GwctlError::OptimisticRollback { operation, source } => {
            assert_eq!(operation, "add_policy");
            assert!(matches!(source.as_ref(), GwctlError::Transport { status: Some(503), .. }));
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert!(err.is_transport_like());
    assert!(!store.policies().iter().any(|p| p.name == "p2"));
    assert_eq!(policy_names(&store, "a"), vec!["p1"]);
    assert!(store.collection_error(Collection::Listeners).is_some());
}

#[tokio::test]
async fn successful_write_after_failure_reconnects() {
    let api = sample_api();
    let cache = Arc::new(MemoryConfigCache::new());
    let store = ConfigStore::builder(api.clone()).cache(cache.clone()).connect().await;

    api.fail_writes(true);
    assert!(store.add_policy("a", rule_set("p2")).await.is_err());
    assert_eq!(store.state(), StoreState::Error);

    api.fail_writes(false);
    store.add_policy("a", rule_set("p3")).await.unwrap();

    assert_eq!(store.state(), StoreState::Connected);
    assert!(store.connection_error().is_none());
    assert!(store.status().last_synced.is_some());
    assert_eq!(policy_names(&store, "a"), vec!["p1", "p3"]);
    let cached = store.cached_configuration().unwrap();
    assert!(cached.policies.iter().any(|p| p.name == "p3"));
}

#[tokio::test]
async fn write_success_clears_only_its_own_collection() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    api.fail_targets(true);
    assert!(store.refresh_targets().await.is_err());
    api.fail_targets(false);

    store.add_policy("a", rule_set("p2")).await.unwrap();

    assert_eq!(store.state(), StoreState::Error);
    assert!(store.collection_error(Collection::Targets).is_some());
    assert!(store.collection_error(Collection::Listeners).is_none());
}

#[tokio::test]
async fn duplicate_policy_is_a_conflict() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    let err = store.add_policy("a", rule_set("p1")).await.unwrap_err();
    assert!(matches!(err, GwctlError::Conflict { .. }));
    assert_eq!(api.write_count(), 0);
}

#[tokio::test]
async fn remove_policy_and_missing_policy() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    store.remove_policy("b", "p1").await.unwrap();
    assert!(policy_names(&store, "b").is_empty());
    // still attached to a
    assert_eq!(store.policy_view()["p1"].listener_names, vec!["a".to_string()]);

    let err = store.remove_policy("b", "p1").await.unwrap_err();
    assert!(matches!(err, GwctlError::NotFound { .. }));

    let err = store.remove_policy("nope", "p1").await.unwrap_err();
    assert!(matches!(err, GwctlError::NotFound { .. }));
}

#[tokio::test]
async fn invalid_rule_set_rejected_before_write() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    let err = store.add_policy("a", rule_set("")).await.unwrap_err();
    assert!(matches!(err, GwctlError::Validation { .. }));
    assert_eq!(api.write_count(), 0);
}

#[tokio::test]
async fn concurrent_policy_edits_are_serialized() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    api.set_write_delay(Duration::from_millis(30));

    let (first, second) =
        tokio::join!(store.add_policy("a", rule_set("p2")), store.add_policy("a", rule_set("p3")));
    first.unwrap();
    second.unwrap();

    let mut names = policy_names(&store, "a");
    names.sort();
    assert_eq!(names, vec!["p1", "p2", "p3"]);

    let writes = api.rbac_writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[1].1.len(), 3);
}

#[tokio::test]
async fn dropped_caller_still_settles_mutation() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    api.set_write_delay(Duration::from_millis(100));

    let pending = store.add_policy("a", rule_set("p2"));
    let result = tokio::time::timeout(Duration::from_millis(10), pending).await;
    assert!(result.is_err());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(policy_names(&store, "a"), vec!["p1", "p2"]);
    assert_eq!(api.rbac_writes.lock().unwrap().len(), 1);
    assert_eq!(store.state(), StoreState::Connected);
}

#[tokio::test]
async fn state_is_loading_while_write_in_flight() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    api.set_write_delay(Duration::from_millis(200));

    let background = store.clone();
    let task = tokio::spawn(async move { background.add_policy("a", rule_set("p2")).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.state(), StoreState::Loading);
    // optimistic state is visible before the write settles
    assert_eq!(policy_names(&store, "a"), vec!["p1", "p2"]);

    task.await.unwrap().unwrap();
    assert_eq!(store.state(), StoreState::Connected);
}

#[tokio::test]
async fn upsert_listener_creates_bind_and_replaces_by_name() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    store.upsert_listener(7070, Listener::new("new")).await.unwrap();
    assert!(store.binds().iter().any(|b| b.port == 7070 && b.listener("new").is_some()));

    let replacement = Listener::new("a").with_route(Route::new("other"));
    store.upsert_listener(8080, replacement).await.unwrap();
    let snapshot = store.snapshot();
    let listener = snapshot.find_listener("a").unwrap();
    assert_eq!(listener.http_routes().len(), 1);
    assert!(listener.http_routes()[0].is_named("other"));

    assert_eq!(api.bind_writes.lock().unwrap().len(), 2);
    assert_eq!(api.document.lock().unwrap().binds, snapshot.binds);
}

#[tokio::test]
async fn upsert_listener_rejects_unnamed_and_mixed_routes() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    let err = store.upsert_listener(8080, Listener::default()).await.unwrap_err();
    assert!(matches!(err, GwctlError::Validation { .. }));

    let mixed = Listener::new("mixed")
        .with_route(Route::new("r"))
        .with_tcp_route(Default::default());
    let err = store.upsert_listener(8080, mixed).await.unwrap_err();
    assert!(matches!(err, GwctlError::Validation { .. }));

    assert_eq!(api.write_count(), 0);
}

#[tokio::test]
async fn remove_listener_and_missing_listener() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    store.remove_listener("b").await.unwrap();
    assert!(store.snapshot().find_listener("b").is_none());

    let err = store.remove_listener("b").await.unwrap_err();
    assert!(matches!(err, GwctlError::NotFound { .. }));
}

#[tokio::test]
async fn route_on_tcp_listener_is_rejected_at_save_time() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    let err = store.upsert_route("tcp", Route::new("web")).await.unwrap_err();
    assert!(matches!(err, GwctlError::Validation { .. }));
    assert_eq!(api.write_count(), 0);
    assert!(store.invalid_listeners().is_empty());
}

#[tokio::test]
async fn route_edits_update_backend_stats() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    store
        .upsert_route("b", Route::new("r2").with_backend(Backend::service("default/svc", 80)))
        .await
        .unwrap();
    store
        .set_route_backends("a", "r1", vec![Backend::mcp(vec![]), Backend::dynamic()])
        .await
        .unwrap();

    let stats = store.backend_stats();
    assert_eq!(stats.total_backends, 3);
    assert_eq!(stats.service_backends, 1);
    assert_eq!(stats.mcp_backends, 1);
    assert_eq!(stats.dynamic_backends, 1);
    assert_eq!(stats.host_backends, 0);

    store.remove_route("b", "r2").await.unwrap();
    assert_eq!(store.route_stats().total_routes, 1);

    let err = store.remove_route("b", "r2").await.unwrap_err();
    assert!(matches!(err, GwctlError::NotFound { .. }));

    let err = store.upsert_route("a", Route::default()).await.unwrap_err();
    assert!(matches!(err, GwctlError::Validation { .. }));
}

#[tokio::test]
async fn target_edits_write_one_untagged_collection() {
    let api = sample_api();
    let store = connected(api.clone()).await;

    store.add_target(TargetType::Mcp, Target::stdio("fs", "mcp-fs", vec![])).await.unwrap();
    assert_eq!(store.targets().len(), 3);
    assert_eq!(store.target_stats().total_targets, 3);

    let writes = api.target_writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, TargetType::Mcp);
    assert_eq!(writes[0].1.len(), 2);
    assert!(writes[0].1.iter().all(|t| t.target_type.is_none()));

    let err = store
        .add_target(TargetType::Mcp, Target::stdio("fs", "other", vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, GwctlError::Conflict { .. }));

    store.remove_target(TargetType::A2a, "agent").await.unwrap();
    assert_eq!(store.targets().len(), 2);

    let err = store.remove_target(TargetType::A2a, "agent").await.unwrap_err();
    assert!(matches!(err, GwctlError::NotFound { .. }));
}

#[tokio::test]
async fn target_rollback_leaves_listeners_alone() {
    let api = sample_api();
    let store = connected(api.clone()).await;
    let binds = store.binds();

    api.fail_writes(true);
    let err = store.remove_target(TargetType::Mcp, "everything").await.unwrap_err();
    assert!(matches!(err, GwctlError::OptimisticRollback { .. }));

    assert_eq!(store.targets().len(), 2);
    assert_eq!(store.binds(), binds);
    assert!(store.collection_error(Collection::Targets).is_some());
    assert!(store.collection_error(Collection::Listeners).is_none());
}

// === Cache ===

#[tokio::test]
async fn cache_written_after_successful_load() {
    let cache = Arc::new(MemoryConfigCache::new());
    let store = ConfigStore::builder(sample_api()).cache(cache.clone()).connect().await;

    let raw = cache.read(CACHE_KEY).unwrap().expect("cache written");
    let cached: Configuration = serde_json::from_str(&raw).unwrap();
    assert_eq!(&cached, store.snapshot().as_ref());
    assert_eq!(store.cached_configuration(), Some(cached));
}

#[tokio::test]
async fn cache_not_written_while_disconnected() {
    let api = sample_api();
    api.fail_config(true);
    let cache = Arc::new(MemoryConfigCache::new());

    let store = ConfigStore::builder(api.clone()).cache(cache.clone()).connect().await;
    assert_eq!(store.state(), StoreState::Error);
    assert!(cache.is_empty());
    assert!(store.cached_configuration().is_none());
}

#[tokio::test]
async fn committed_mutation_skips_cache_while_a_collection_is_failing() {
    let api = sample_api();
    let cache = Arc::new(MemoryConfigCache::new());
    let store = ConfigStore::builder(api.clone()).cache(cache.clone()).connect().await;
    let cached_version = store.cached_configuration().unwrap().version;

    api.fail_targets(true);
    assert!(store.refresh_targets().await.is_err());

    store.add_policy("a", rule_set("p2")).await.unwrap();
    assert_eq!(store.cached_configuration().unwrap().version, cached_version);

    api.fail_targets(false);
    store.refresh_targets().await.unwrap();
    let cached = store.cached_configuration().unwrap();
    assert!(cached.policies.iter().any(|p| p.name == "p2"));
}

#[tokio::test]
async fn file_cache_survives_store() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let cache = Arc::new(gwctl::store::FileConfigCache::new(temp_dir.path()));
    let store = ConfigStore::builder(sample_api()).cache(cache).connect().await;
    let version = store.snapshot().version;
    drop(store);

    let reopened = ConfigStore::builder(sample_api())
        .cache(Arc::new(gwctl::store::FileConfigCache::new(temp_dir.path())))
        .build();
    assert_eq!(reopened.cached_configuration().map(|c| c.version), Some(version));
    // the hint is never installed as state
    assert_eq!(reopened.snapshot().version, 0);
}

// === Wire format ===

#[test]
fn configuration_round_trips_through_wire_form() {
    let document: ConfigDocument = serde_json::from_value(wire_configuration()).unwrap();
    let configuration = Configuration {
        source: document.source,
        binds: document.binds,
        ..Configuration::default()
    }
    .with_derived_policies();

    let wire = serde_json::to_string(&configuration).unwrap();
    let parsed: Configuration = serde_json::from_str(&wire).unwrap();
    assert_eq!(parsed, configuration);

    let backends = &configuration.binds[0].listeners[0].http_routes()[0].backends;
    assert_eq!(backends.len(), 6);
    assert_eq!(configuration.policies.len(), 1);
}
