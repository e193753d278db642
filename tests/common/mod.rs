//! Common test utilities for all integration tests.
//!
//! Provides configuration fixtures and an in-memory [`GatewayApi`] that counts
//! calls and can be told to fail.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use gwctl::client::GatewayApi;
use gwctl::domain::{
    Backend, Bind, ConfigDocument, ConfigSource, Listener, Route, RuleSet, Target, TargetType,
    TcpRoute,
};
use gwctl::errors::{GwctlError, Result};

/// Gateway double holding the remote configuration in memory
#[derive(Default)]
pub struct MockGatewayApi {
    pub document: Mutex<ConfigDocument>,
    pub mcp: Mutex<Vec<Target>>,
    pub a2a: Mutex<Vec<Target>>,
    pub rbac_writes: Mutex<Vec<(String, Vec<RuleSet>)>>,
    pub bind_writes: Mutex<Vec<Vec<Bind>>>,
    pub target_writes: Mutex<Vec<(TargetType, Vec<Target>)>>,
    calls: AtomicUsize,
    fail_config: AtomicBool,
    fail_targets: AtomicBool,
    fail_writes: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl MockGatewayApi {
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    pub fn with_binds(binds: Vec<Bind>) -> Self {
        Self::new(ConfigDocument {
            source: ConfigSource::Static,
            binds,
        })
    }

    pub fn with_targets(self, mcp: Vec<Target>, a2a: Vec<Target>) -> Self {
        *self.mcp.lock().unwrap() = mcp;
        *self.a2a.lock().unwrap() = a2a;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Total number of requests issued
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.rbac_writes.lock().unwrap().len()
            + self.bind_writes.lock().unwrap().len()
            + self.target_writes.lock().unwrap().len()
    }

    pub fn fail_config(&self, fail: bool) {
        self.fail_config.store(fail, Ordering::SeqCst);
    }

    pub fn fail_targets(&self, fail: bool) {
        self.fail_targets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_source(&self, source: ConfigSource) {
        self.document.lock().unwrap().source = source;
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn unavailable(endpoint: &str) -> GwctlError {
        GwctlError::transport_status(format!("{} returned 503 Service Unavailable", endpoint), 503)
    }

    async fn before_write(&self, endpoint: &str) -> Result<()> {
        self.record_call();
        let delay = *self.write_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable(endpoint));
        }
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for MockGatewayApi {
    async fn fetch_config(&self) -> Result<ConfigDocument> {
        self.record_call();
        if self.fail_config.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/config"));
        }
        Ok(self.document.lock().unwrap().clone())
    }

    async fn fetch_listeners(&self) -> Result<Vec<Listener>> {
        self.record_call();
        if self.fail_config.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/listeners"));
        }
        let document = self.document.lock().unwrap();
        Ok(document.binds.iter().flat_map(|b| b.listeners.clone()).collect())
    }

    async fn fetch_mcp_targets(&self) -> Result<Vec<Target>> {
        self.record_call();
        if self.fail_targets.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/targets/mcp"));
        }
        Ok(self.mcp.lock().unwrap().clone())
    }

    async fn fetch_a2a_targets(&self) -> Result<Vec<Target>> {
        self.record_call();
        if self.fail_targets.load(Ordering::SeqCst) {
            return Err(Self::unavailable("/targets/a2a"));
        }
        Ok(self.a2a.lock().unwrap().clone())
    }

    async fn replace_rbac_policies(&self, listener: &str, policies: &[RuleSet]) -> Result<()> {
        self.before_write("/rbac").await?;
        let mut document = self.document.lock().unwrap();
        if let Some(target) = document
            .binds
            .iter_mut()
            .flat_map(|b| b.listeners.iter_mut())
            .find(|l| l.is_named(listener))
        {
            *target.policies_mut() = policies.to_vec();
        }
        self.rbac_writes.lock().unwrap().push((listener.to_string(), policies.to_vec()));
        Ok(())
    }

    async fn replace_binds(&self, binds: &[Bind]) -> Result<()> {
        self.before_write("/config/binds").await?;
        self.document.lock().unwrap().binds = binds.to_vec();
        self.bind_writes.lock().unwrap().push(binds.to_vec());
        Ok(())
    }

    async fn replace_targets(&self, target_type: TargetType, targets: &[Target]) -> Result<()> {
        self.before_write("/targets").await?;
        match target_type {
            TargetType::Mcp => *self.mcp.lock().unwrap() = targets.to_vec(),
            TargetType::A2a => *self.a2a.lock().unwrap() = targets.to_vec(),
        }
        self.target_writes.lock().unwrap().push((target_type, targets.to_vec()));
        Ok(())
    }
}

// === Fixtures ===

pub fn rule_set(name: &str) -> RuleSet {
    RuleSet::new(name, "default")
}

/// Port 8080 with listeners `a` and `b` sharing policy `p1`, port 9090 with
/// a TCP listener
pub fn sample_binds() -> Vec<Bind> {
    vec![
        Bind::new(8080)
            .with_listener(
                Listener::new("a")
                    .with_route(Route::new("r1").with_backend(Backend::host("api.internal:8080")))
                    .with_policy(rule_set("p1")),
            )
            .with_listener(Listener::new("b").with_policy(rule_set("p1"))),
        Bind::new(9090).with_listener(Listener::new("tcp").with_tcp_route(TcpRoute {
            backends: vec![Backend::host("db:5432")],
            ..TcpRoute::default()
        })),
    ]
}

/// One bind, two listeners: one host backend and two mcp backends
pub fn backend_scenario_binds() -> Vec<Bind> {
    vec![Bind::new(3000)
        .with_listener(
            Listener::new("l1")
                .with_route(Route::new("r1").with_backend(Backend::host("example.com:80"))),
        )
        .with_listener(
            Listener::new("l2").with_route(
                Route::new("r2")
                    .with_backend(Backend::mcp(vec![]))
                    .with_backend(Backend::mcp(vec![])),
            ),
        )]
}

pub fn sample_targets() -> (Vec<Target>, Vec<Target>) {
    (
        vec![Target::stdio("everything", "npx", vec!["-y".to_string(), "server".to_string()])],
        vec![Target::sse("agent", "agent.internal", 8080, "/sse")],
    )
}

/// Raw wire form of a configuration with every backend kind
pub fn wire_configuration() -> serde_json::Value {
    json!({
        "type": "static",
        "binds": [{
            "port": 3000,
            "listeners": [{
                "name": "sse",
                "protocol": "HTTP",
                "sse": {
                    "rbac": [{
                        "name": "allow-alice",
                        "namespace": "default",
                        "rules": [{
                            "key": "sub",
                            "value": "alice",
                            "resource": {"type": "tool", "id": "*"},
                            "matcher": {"type": "equals"}
                        }]
                    }]
                },
                "routes": [{
                    "name": "mixed",
                    "hostnames": ["example.com"],
                    "matches": [{"path": {"pathPrefix": "/"}}],
                    "backends": [
                        {"host": "example.com:80", "weight": 2},
                        {"service": {"name": "default/svc", "port": 8080}},
                        {"ai": {"provider": {"openAI": {"model": "gpt-4o"}}}},
                        {"mcp": {"targets": [{"name": "t", "stdio": {"cmd": "echo"}}]}},
                        {"dynamic": {}},
                        {"somethingNew": {"x": 1}}
                    ]
                }]
            }]
        }]
    })
}
