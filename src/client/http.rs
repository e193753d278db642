//! `reqwest` implementation of [`GatewayApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::client::{decode_body, decode_collection, decode_one_or_many, paths, GatewayApi};
use crate::config::ClientSettings;
use crate::domain::{Bind, ConfigDocument, Listener, RuleSet, Target, TargetType};
use crate::errors::{GwctlError, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct GatewayClientConfig {
    /// Admin API base URL (e.g., "http://localhost:15000")
    pub base_url: Url,

    /// Optional bearer token
    pub token: Option<String>,

    /// Whole-request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,
}

impl GatewayClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl TryFrom<&ClientSettings> for GatewayClientConfig {
    type Error = GwctlError;

    fn try_from(settings: &ClientSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            GwctlError::config(format!("Invalid gateway URL '{}': {}", settings.base_url, e))
        })?;
        Ok(Self {
            base_url,
            token: settings.token.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
            connect_timeout: Duration::from_secs(settings.connect_timeout_seconds),
        })
    }
}

/// Gateway admin API client
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    config: GatewayClientConfig,
}

impl GatewayClient {
    /// Create a new client with the given configuration
    pub fn new(config: GatewayClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GwctlError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a client from resolved settings
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(GatewayClientConfig::try_from(settings)?)
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// Resolve an endpoint plus optional escaped path segments against the base URL
    fn url(&self, endpoint: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                let base = &self.config.base_url;
                GwctlError::config(format!("Gateway URL '{}' cannot be a base", base))
            })?;
            path.pop_if_empty();
            path.extend(endpoint.split('/').filter(|s| !s.is_empty()));
            path.extend(segments);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                GwctlError::transport(format!("Request to {} timed out", endpoint))
            } else {
                GwctlError::transport(format!("Request to {} failed: {}", endpoint, e))
            }
        })?;

        let status = response.status();
        debug!(endpoint, status = status.as_u16(), "gateway response");

        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "<unable to read error>".to_string());
            trace!(endpoint, body = %error_text, "gateway error body");
            return Err(GwctlError::transport_status(
                format!("{} returned {}: {}", endpoint, status, error_text),
                status.as_u16(),
            ));
        }

        Ok(response)
    }

    /// Send a GET request and return the JSON body
    async fn get_value(&self, endpoint: &str) -> Result<Value> {
        let url = self.url(endpoint, &[])?;
        debug!("GET {}", url);

        let response = self.send(endpoint, self.client.get(url)).await?;
        let body = response.text().await.map_err(|e| {
            GwctlError::transport(format!("Failed to read response body from {}: {}", endpoint, e))
        })?;
        trace!(endpoint, "Response body:\n{}", body);

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| super::malformed(endpoint, e.to_string()))
    }

    /// Send a PUT request with a JSON body; the response body is ignored
    async fn put_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        segments: &[&str],
        body: &T,
    ) -> Result<()> {
        let url = self.url(endpoint, segments)?;
        debug!("PUT {}", url);

        if tracing::enabled!(tracing::Level::TRACE) {
            let body_json = serde_json::to_string_pretty(body)
                .unwrap_or_else(|_| "<unable to serialize>".to_string());
            trace!("Request body:\n{}", body_json);
        }

        self.send(endpoint, self.client.put(url).json(body)).await?;
        Ok(())
    }
}

#[async_trait]
impl GatewayApi for GatewayClient {
    async fn fetch_config(&self) -> Result<ConfigDocument> {
        let body = self.get_value(paths::CONFIG).await?;
        decode_body(paths::CONFIG, body)
    }

    async fn fetch_listeners(&self) -> Result<Vec<Listener>> {
        let body = self.get_value(paths::LISTENERS).await?;
        decode_one_or_many(paths::LISTENERS, body)
    }

    async fn fetch_mcp_targets(&self) -> Result<Vec<Target>> {
        let endpoint = format!("{}/{}", paths::TARGETS, TargetType::Mcp);
        let body = self.get_value(&endpoint).await?;
        decode_collection(&endpoint, body)
    }

    async fn fetch_a2a_targets(&self) -> Result<Vec<Target>> {
        let endpoint = format!("{}/{}", paths::TARGETS, TargetType::A2a);
        let body = self.get_value(&endpoint).await?;
        decode_collection(&endpoint, body)
    }

    async fn replace_rbac_policies(&self, listener: &str, policies: &[RuleSet]) -> Result<()> {
        self.put_json(paths::RBAC, &[listener], policies).await
    }

    async fn replace_binds(&self, binds: &[Bind]) -> Result<()> {
        self.put_json(paths::CONFIG_BINDS, &[], binds).await
    }

    async fn replace_targets(&self, target_type: TargetType, targets: &[Target]) -> Result<()> {
        self.put_json(paths::TARGETS, &[target_type.as_str()], targets).await
    }
}
