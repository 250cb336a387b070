//! Proxy transport
//!
//! Forwards each request to a hosted HTTP deployment and relays its answer,
//! so a stdio client can talk to a remote gateway.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Map};

use crate::error::{ConfigError, GatewayError, McpError, Result};
use crate::mcp::types::{JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::transport::{enriched_error, RequestHandler, RequestMeta, TransportAdapter};

/// Adapter for errors raised by the proxy itself
#[derive(Debug, Default)]
pub struct ProxyAdapter;

impl TransportAdapter for ProxyAdapter {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn format_error(&self, id: RequestId, error: &GatewayError, debug: bool) -> JsonRpcResponse {
        let mut fields = Map::new();
        fields.insert("transport".into(), json!("proxy"));
        enriched_error(id, error, debug, fields)
    }
}

pub struct ProxyHandler {
    http_client: reqwest::Client,
    endpoint: String,
    debug: bool,
}

impl ProxyHandler {
    /// `endpoint` is the full URL, key included (e.g. `https://host/mcp/{key}`)
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let url = reqwest::Url::parse(&endpoint).map_err(|e| ConfigError::InvalidConfig {
            message: format!("proxy endpoint '{}': {}", endpoint, e),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidConfig {
                message: format!("proxy endpoint must be http or https, got '{}'", url.scheme()),
            }
            .into());
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            endpoint,
            debug: false,
        })
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one request; `None` when the remote sends no body
    async fn forward(&self, request: &JsonRpcRequest) -> Result<Option<JsonRpcResponse>> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if body.is_empty() {
            if status.is_success() {
                return Ok(None);
            }
            return Err(remote_failure(status));
        }

        // Error bodies on 4xx are still JSON-RPC responses worth relaying
        match serde_json::from_slice::<JsonRpcResponse>(&body) {
            Ok(relayed) => Ok(Some(relayed)),
            Err(e) => {
                tracing::warn!(%status, error = %e, "remote returned a non JSON-RPC body");
                Err(remote_failure(status))
            }
        }
    }
}

fn remote_failure(status: StatusCode) -> GatewayError {
    McpError::Transport {
        message: format!("remote endpoint returned HTTP {}", status),
    }
    .into()
}

#[async_trait]
impl RequestHandler for ProxyHandler {
    async fn handle(&self, request: JsonRpcRequest, _meta: RequestMeta) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        tracing::debug!(method = %request.method, "forwarding request");

        match (id, self.forward(&request).await) {
            (None, Ok(_)) => None,
            (None, Err(e)) => {
                tracing::warn!(error = %e, method = %request.method, "failed to forward notification");
                None
            }
            (Some(_), Ok(Some(response))) => {
                if response.is_error() {
                    tracing::debug!(method = %request.method, "remote answered with an error");
                }
                Some(response)
            }
            (Some(id), Ok(None)) => {
                let error: GatewayError = McpError::Transport {
                    message: "remote endpoint sent no response".into(),
                }
                .into();
                Some(ProxyAdapter.format_error(id, &error, self.debug))
            }
            (Some(id), Err(e)) => {
                tracing::error!(error = %e, "proxy request failed");
                let error: GatewayError = match e {
                    e @ GatewayError::Mcp(McpError::Transport { .. }) => e,
                    other => McpError::Transport {
                        message: other.to_string(),
                    }
                    .into(),
                };
                Some(ProxyAdapter.format_error(id, &error, self.debug))
            }
        }
    }
}
