//! MCP Server implementation
//!
//! Transport-independent JSON-RPC dispatcher. Every request is answered with
//! exactly one response envelope (none for notifications); failures never
//! escape as Rust errors.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{redact_secrets, GatewayError, McpError, Result};
use crate::mcp::completion::{complete, CompleteParams};
use crate::mcp::context::RequestContext;
use crate::mcp::pagination::{paginate, PageRequest};
use crate::mcp::prompts::{get_prompt, list_prompts, GetPromptParams};
use crate::mcp::resources::{list_resources, read_resource};
use crate::mcp::tools::ToolRegistry;
use crate::mcp::types::*;
use crate::providers::{Provider, ProviderRegistry};
use crate::transport::{RequestHandler, RequestMeta, TransportAdapter};

/// MCP Server info
pub const SERVER_NAME: &str = "assistants-mcp-gateway";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server for the Assistants API
pub struct McpServer {
    /// Tool handlers, shared across servers
    tools: Arc<ToolRegistry>,

    /// Backend providers
    providers: Arc<ProviderRegistry>,

    /// Host-specific hooks
    adapter: Option<Arc<dyn TransportAdapter>>,

    /// Include debug detail in error data
    debug: bool,

    /// Whether initialized
    initialized: AtomicBool,
}

#[derive(serde::Deserialize)]
struct ReadResourceParams {
    uri: String,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tools: Arc<ToolRegistry>, providers: Arc<ProviderRegistry>) -> Self {
        Self {
            tools,
            providers,
            adapter: None,
            debug: false,
            initialized: AtomicBool::new(false),
        }
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn TransportAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Handle one request; `None` for notifications
    pub async fn handle_request(
        &self,
        mut request: JsonRpcRequest,
        mut meta: RequestMeta,
    ) -> Option<JsonRpcResponse> {
        let notification = request.is_notification();
        let id = request.id.clone().unwrap_or(RequestId::Null);

        let outcome = match &self.adapter {
            Some(adapter) => match adapter.preprocess_request(&mut request, &mut meta) {
                Ok(()) => self.route(&request, &id, &meta).await,
                Err(e) => Err(e),
            },
            None => self.route(&request, &id, &meta).await,
        };

        if notification {
            if let Err(e) = outcome {
                tracing::debug!(method = %request.method, error = %e, "notification failed");
            }
            return None;
        }

        let response = match outcome {
            Ok(result) => {
                let response = JsonRpcResponse::success(id, result);
                match &self.adapter {
                    Some(adapter) => adapter.postprocess_response(response, &meta),
                    None => response,
                }
            }
            Err(err) => {
                tracing::debug!(method = %request.method, error = %err, "request failed");
                self.error_response(id, &err)
            }
        };
        Some(response)
    }

    /// Error envelope through the adapter, or the plain JSON-RPC builder
    pub fn error_response(&self, id: RequestId, err: &GatewayError) -> JsonRpcResponse {
        match &self.adapter {
            Some(adapter) => adapter.format_error(id, err, self.debug),
            None => JsonRpcResponse::error(id, err.to_rpc_error(self.debug)),
        }
    }

    async fn route(&self, request: &JsonRpcRequest, id: &RequestId, meta: &RequestMeta) -> Result<Value> {
        let params = request.params.clone();
        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::INITIALIZED => {
                self.initialized.store(true, Ordering::SeqCst);
                Ok(json!({}))
            }
            methods::PING => Ok(json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(params, id, meta).await,
            methods::LIST_RESOURCES => {
                let list: ListParams = optional_params(params)?;
                let page = paginate(&list_resources(), &page_request(list))?;
                Ok(list_result("resources", serde_json::to_value(page.items)?, page.next_cursor))
            }
            methods::READ_RESOURCE => {
                let read: ReadResourceParams = required_params(params)?;
                let content = read_resource(&read.uri)?;
                Ok(json!({ "contents": [content] }))
            }
            methods::LIST_PROMPTS => {
                let list: ListParams = optional_params(params)?;
                let page = paginate(&list_prompts(), &page_request(list))?;
                Ok(list_result("prompts", serde_json::to_value(page.items)?, page.next_cursor))
            }
            methods::GET_PROMPT => {
                let get: GetPromptParams = required_params(params)?;
                Ok(serde_json::to_value(get_prompt(&get)?)?)
            }
            methods::COMPLETE => {
                let params: CompleteParams = required_params(params)?;
                Ok(serde_json::to_value(complete(&params)?)?)
            }
            other => Err(McpError::MethodNotFound {
                method: other.to_string(),
            }
            .into()),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> Result<Value> {
        self.initialized.store(true, Ordering::SeqCst);

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                resources: Some(ResourcesCapability::default()),
                prompts: Some(PromptsCapability::default()),
                completions: Some(CompletionsCapability {}),
                experimental: Some(json!({
                    "providers": {
                        "available": self.providers.provider_names(),
                        "default": self.providers.default_provider_name(),
                    }
                })),
            },
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> Result<Value> {
        let result = ListToolsResult {
            tools: self.tools.definitions(),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Handle call tool request.
    ///
    /// Envelope problems (params, provider resolution) are JSON-RPC errors;
    /// anything after that is reported in-band with `isError`.
    async fn handle_call_tool(
        &self,
        params: Option<Value>,
        id: &RequestId,
        meta: &RequestMeta,
    ) -> Result<Value> {
        let params: CallToolParams = required_params(params)?;
        let (provider_name, provider) = self.resolve_provider(meta, params.provider.as_deref())?;

        let ctx = RequestContext::new(provider_name, provider, params.name.as_str(), id.clone());
        let arguments = if params.arguments.is_null() {
            json!({})
        } else {
            params.arguments
        };

        let result = match self.tools.execute(&params.name, &ctx, &arguments).await {
            Ok(value) => match serde_json::to_string_pretty(&value) {
                Ok(text) => CallToolResult::text(text),
                Err(e) => CallToolResult::error(e.to_string()),
            },
            Err(err) => CallToolResult::error(redact_secrets(&err.to_string())),
        };

        Ok(serde_json::to_value(result)?)
    }

    /// Transport choice, then params, then the registry default
    fn resolve_provider(
        &self,
        meta: &RequestMeta,
        requested: Option<&str>,
    ) -> Result<(String, Arc<dyn Provider>)> {
        match meta.provider.as_deref().or(requested) {
            Some(name) => self
                .providers
                .get_provider(name)
                .map(|provider| (name.to_string(), provider))
                .ok_or_else(|| {
                    McpError::UnknownProvider {
                        name: name.to_string(),
                        available: self.providers.provider_names(),
                    }
                    .into()
                }),
            None => match (
                self.providers.default_provider_name(),
                self.providers.default_provider(),
            ) {
                (Some(name), Some(provider)) => Ok((name.to_string(), provider)),
                _ => Err(McpError::NoDefaultProvider.into()),
            },
        }
    }
}

#[async_trait]
impl RequestHandler for McpServer {
    async fn handle(&self, request: JsonRpcRequest, meta: RequestMeta) -> Option<JsonRpcResponse> {
        self.handle_request(request, meta).await
    }
}

fn invalid_params(message: impl Into<String>) -> GatewayError {
    McpError::InvalidParams {
        message: message.into(),
    }
    .into()
}

fn required_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T> {
    let params = params
        .filter(|p| !p.is_null())
        .ok_or_else(|| invalid_params("missing params"))?;
    serde_json::from_value(params).map_err(|e| invalid_params(e.to_string()))
}

fn optional_params<T: DeserializeOwned + Default>(params: Option<Value>) -> Result<T> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(params) => serde_json::from_value(params).map_err(|e| invalid_params(e.to_string())),
    }
}

fn page_request(params: ListParams) -> PageRequest {
    PageRequest {
        cursor: params.cursor,
        limit: params.limit,
    }
}

fn list_result(key: &str, items: Value, next_cursor: Option<String>) -> Value {
    let mut result = serde_json::Map::new();
    result.insert(key.to_string(), items);
    if let Some(cursor) = next_cursor {
        result.insert("nextCursor".to_string(), Value::String(cursor));
    }
    Value::Object(result)
}
