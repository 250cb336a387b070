//! HTTP transport
//!
//! `POST /mcp/{key}` or `POST /mcp/{provider}/{key}` with one JSON-RPC
//! request per body. The key in the path is forwarded to the backend by
//! building a provider registry per request from the configured template.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ALLOW,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Map};

use crate::config::ProvidersConfig;
use crate::error::{ErrorCode, GatewayError, McpError, Result};
use crate::mcp::server::McpServer;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::{JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::providers::ProviderRegistry;
use crate::transport::{decode_request, enriched_error, RequestMeta, TransportAdapter};

/// Shortest key accepted in the path
pub const MIN_KEY_LEN: usize = 20;

const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// Target parsed from the request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpPath {
    pub provider: Option<String>,
    pub api_key: String,
}

fn valid_provider_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Parse `/mcp/{key}` or `/mcp/{provider}/{key}`
pub fn parse_path(path: &str) -> Result<McpPath> {
    let malformed = || -> GatewayError {
        McpError::InvalidRequest {
            message: "malformed path; expected /mcp/{key} or /mcp/{provider}/{key}".into(),
        }
        .into()
    };

    let segments: Vec<&str> = path.trim_end_matches('/').split('/').skip(1).collect();
    let (provider, key) = match segments.as_slice() {
        ["mcp"] => {
            return Err(McpError::Unauthorized {
                message: "missing API key in path".into(),
            }
            .into())
        }
        ["mcp", key] => (None, *key),
        ["mcp", provider, key] => (Some(*provider), *key),
        _ => return Err(malformed()),
    };

    if let Some(provider) = provider {
        if !valid_provider_segment(provider) {
            return Err(malformed());
        }
    }

    let api_key = urlencoding::decode(key).map_err(|_| malformed())?.into_owned();
    if api_key.chars().count() < MIN_KEY_LEN {
        return Err(McpError::Unauthorized {
            message: format!("API key must be at least {} characters", MIN_KEY_LEN),
        }
        .into());
    }

    Ok(McpPath {
        provider: provider.map(str::to_string),
        api_key,
    })
}

/// Adapter for the HTTP host
#[derive(Debug, Default)]
pub struct HttpAdapter;

impl TransportAdapter for HttpAdapter {
    fn name(&self) -> &'static str {
        "http"
    }

    /// Attach the provider named in the URL path
    fn preprocess_request(
        &self,
        _request: &mut JsonRpcRequest,
        meta: &mut RequestMeta,
    ) -> std::result::Result<(), GatewayError> {
        if let Some(path) = meta.path.as_deref() {
            let parsed = parse_path(path)?;
            meta.provider = parsed.provider;
            meta.api_key.get_or_insert(parsed.api_key);
        }
        Ok(())
    }

    fn format_error(&self, id: RequestId, error: &GatewayError, debug: bool) -> JsonRpcResponse {
        let mut fields = Map::new();
        fields.insert("transport".into(), json!("http"));
        fields.insert("edge".into(), json!(true));
        fields.insert("timestamp".into(), json!(chrono::Utc::now().to_rfc3339()));
        enriched_error(id, error, debug, fields)
    }
}

/// Shared router state
#[derive(Clone)]
pub struct HttpState {
    tools: Arc<ToolRegistry>,
    providers: Arc<ProvidersConfig>,
    debug: bool,
}

impl HttpState {
    /// `providers` is a template; each request gets a copy with its key
    pub fn new(tools: Arc<ToolRegistry>, providers: ProvidersConfig, debug: bool) -> Self {
        Self {
            tools,
            providers: Arc::new(providers),
            debug,
        }
    }
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/mcp", any(handle_mcp))
        .route("/mcp/*rest", any(handle_mcp))
        .with_state(state)
}

/// Bind and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: HttpState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP transport listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down HTTP transport");
        })
        .await?;
    Ok(())
}

fn add_cors(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
}

fn respond(status: StatusCode, body: Option<JsonRpcResponse>) -> Response {
    let mut response = match body {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    };
    add_cors(response.headers_mut());
    response
}

/// HTTP status for errors raised before dispatch
fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ParseError | ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

fn reject(state: &HttpState, id: RequestId, error: GatewayError) -> Response {
    let status = status_for(error.code());
    respond(status, Some(HttpAdapter.format_error(id, &error, state.debug)))
}

async fn handle_mcp(State(state): State<HttpState>, method: Method, uri: Uri, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        return respond(StatusCode::NO_CONTENT, None);
    }
    if method != Method::POST {
        let mut response = respond(StatusCode::METHOD_NOT_ALLOWED, None);
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        return response;
    }

    let path = match parse_path(uri.path()) {
        Ok(path) => path,
        Err(e) => return reject(&state, RequestId::Null, e),
    };

    let request = match decode_request(&body) {
        Ok(request) => request,
        Err((id, e)) => return reject(&state, id, e),
    };
    let id = request.id.clone().unwrap_or(RequestId::Null);

    let providers = ProviderRegistry::from_config(&state.providers.with_api_key(&path.api_key)).await;
    let server = McpServer::new(state.tools.clone(), Arc::new(providers))
        .with_adapter(Arc::new(HttpAdapter))
        .with_debug(state.debug);
    let meta = RequestMeta {
        provider: None,
        api_key: Some(path.api_key),
        path: Some(uri.path().to_string()),
    };

    tracing::debug!(method = %request.method, id = %id, provider = ?path.provider, "HTTP request");

    match tokio::spawn(async move { server.handle_request(request, meta).await }).await {
        Ok(Some(response)) => respond(StatusCode::OK, Some(response)),
        Ok(None) => respond(StatusCode::ACCEPTED, None),
        Err(e) => {
            tracing::error!(error = %e, "request handler panicked");
            let error: GatewayError = McpError::Transport {
                message: "request handler panicked".into(),
            }
            .into();
            reject(&state, id, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LegacyConfig;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const KEY: &str = "sk-test-000000000000000000";

    fn app() -> Router {
        let tools = Arc::new(ToolRegistry::with_default_tools().unwrap());
        router(HttpState::new(
            tools,
            ProvidersConfig::from_legacy(LegacyConfig::default()),
            false,
        ))
    }

    async fn send(method: &str, uri: &str, body: &str) -> (StatusCode, HeaderMap, Option<Value>) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).ok();
        (status, headers, json)
    }

    #[test]
    fn test_parse_path() {
        let path = parse_path(&format!("/mcp/{}", KEY)).unwrap();
        assert_eq!(path.provider, None);
        assert_eq!(path.api_key, KEY);

        let path = parse_path(&format!("/mcp/openai/{}", KEY)).unwrap();
        assert_eq!(path.provider.as_deref(), Some("openai"));

        let err = parse_path(&format!("/mcp/Open.AI/{}", KEY)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let err = parse_path("/mcp/short").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);

        let err = parse_path(&format!("/mcp/a/b/{}", KEY)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_preflight_and_method_guard() {
        let (status, headers, _) = send("OPTIONS", &format!("/mcp/{}", KEY), "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let (status, headers, _) = send("GET", &format!("/mcp/{}", KEY), "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[ALLOW], ALLOWED_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_short_key_is_unauthorized() {
        let (status, headers, body) = send(
            "POST",
            "/mcp/short-key",
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let error = &body.unwrap()["error"];
        assert_eq!(error["code"], -32001);
        assert_eq!(error["data"]["transport"], "http");
        assert_eq!(error["data"]["edge"], true);
    }

    #[tokio::test]
    async fn test_bad_bodies_are_400() {
        let uri = format!("/mcp/{}", KEY);
        let (status, _, body) = send("POST", &uri, "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body.unwrap();
        assert_eq!(body["error"]["code"], -32700);
        assert!(body["id"].is_null());

        let (status, _, body) = send("POST", &uri, r#"{"jsonrpc":"2.0","id":4}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body = body.unwrap();
        assert_eq!(body["error"]["code"], -32600);
        assert_eq!(body["id"], 4);
    }

    #[tokio::test]
    async fn test_ping_and_notification() {
        let uri = format!("/mcp/{}", KEY);
        let (status, _, body) = send("POST", &uri, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.unwrap()["result"], json!({}));

        let (status, _, body) = send(
            "POST",
            &uri,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_malformed_provider_segment_is_400() {
        let (status, _, body) = send(
            "POST",
            &format!("/mcp/Open.AI/{}", KEY),
            r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = &body.unwrap()["error"];
        assert_eq!(error["code"], -32600);
        assert_eq!(error["data"]["transport"], "http");
    }

    #[tokio::test]
    async fn test_unknown_provider_in_path() {
        let (status, _, body) = send(
            "POST",
            &format!("/mcp/acme/{}", KEY),
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"assistant-list"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let error = &body.unwrap()["error"];
        assert_eq!(error["code"], -32601);
        assert_eq!(error["data"]["available_providers"], json!(["openai"]));
        assert_eq!(error["data"]["transport"], "http");
    }
}
