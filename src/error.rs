//! Error types for the Assistants MCP Gateway
//!
//! This module defines the error hierarchy for all operations in the gateway
//! and the closed set of numeric codes those errors map to on the wire.

use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::types::JsonRpcError;

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Backend provider errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// A tool failed while talking to its provider
    #[error("Tool '{tool}' failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: Box<GatewayError>,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Backend provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Operation '{operation}' is not implemented by provider '{provider}'")]
    NotImplemented { provider: String, operation: String },

    #[error("Provider '{provider}' does not support {capability}")]
    Unsupported { provider: String, capability: String },

    #[error("Provider '{provider}' failed to initialize: {message}")]
    InitializationFailed { provider: String, message: String },

    #[error("Backend rejected credentials: {message}")]
    Unauthorized { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("API request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to read providers file {path}: {message}")]
    ProvidersFile { path: String, message: String },

    #[error("Missing required setting: {name}")]
    MissingSetting { name: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Validation errors
///
/// Every variant names the offending parameter and carries a corrective
/// example so callers can fix the request without reading documentation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter '{field}'. Example: {example}")]
    MissingField { field: String, example: String },

    #[error("Invalid parameter '{name}': {message}. Example: {example}")]
    InvalidParameter {
        name: String,
        message: String,
        example: String,
    },

    #[error("Invalid or expired cursor")]
    InvalidCursor,
}

impl ValidationError {
    pub fn missing(field: impl Into<String>, example: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            example: example.into(),
        }
    }

    pub fn invalid(
        name: impl Into<String>,
        message: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
            example: example.into(),
        }
    }

    /// Name of the parameter that failed validation, if any
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. } => Some(field),
            Self::InvalidParameter { name, .. } => Some(name),
            Self::InvalidCursor => None,
        }
    }

    fn example(&self) -> Option<&str> {
        match self {
            Self::MissingField { example, .. } | Self::InvalidParameter { example, .. } => {
                Some(example)
            }
            Self::InvalidCursor => None,
        }
    }
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Tool already registered: {name}")]
    DuplicateTool { name: String },

    #[error("Unknown provider: {name}")]
    UnknownProvider { name: String, available: Vec<String> },

    #[error("No provider configured; set OPENAI_API_KEY or configure a providers file")]
    NoDefaultProvider,

    #[error("Missing or malformed credential: {message}")]
    Unauthorized { message: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String, available: Vec<String> },

    #[error("Unknown prompt: {name}")]
    UnknownPrompt { name: String, available: Vec<String> },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Closed namespace of error codes sent on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    Unauthorized,
    NotFound,
}

impl ErrorCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::Unauthorized => -32001,
            Self::NotFound => -32002,
        }
    }
}

impl GatewayError {
    /// Wire code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::InvalidParams,
            Self::Mcp(err) => match err {
                McpError::Parse { .. } => ErrorCode::ParseError,
                McpError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
                McpError::MethodNotFound { .. } | McpError::UnknownProvider { .. } => {
                    ErrorCode::MethodNotFound
                }
                McpError::InvalidParams { .. } | McpError::UnknownPrompt { .. } => {
                    ErrorCode::InvalidParams
                }
                McpError::UnknownTool { .. } | McpError::ResourceNotFound { .. } => {
                    ErrorCode::NotFound
                }
                McpError::NoDefaultProvider | McpError::Unauthorized { .. } => {
                    ErrorCode::Unauthorized
                }
                McpError::DuplicateTool { .. } | McpError::Transport { .. } => {
                    ErrorCode::InternalError
                }
            },
            Self::Provider(err) => match err {
                ProviderError::Unauthorized { .. } => ErrorCode::Unauthorized,
                ProviderError::NotFound { .. } => ErrorCode::NotFound,
                _ => ErrorCode::InternalError,
            },
            Self::ToolExecution { source, .. } => source.code(),
            Self::Config(_) | Self::Io(_) | Self::Json(_) | Self::Http(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Build the JSON-RPC error object for this error.
    ///
    /// `data` is additive: clients never need it to act on the error.
    pub fn to_rpc_error(&self, debug: bool) -> JsonRpcError {
        let code = self.code();
        let message = redact_secrets(&self.to_string());

        let data = match self {
            Self::Validation(err) => {
                let mut data = serde_json::Map::new();
                if let Some(parameter) = err.parameter() {
                    data.insert("parameter".into(), json!(parameter));
                }
                if let Some(example) = err.example() {
                    data.insert("example".into(), json!(example));
                }
                (!data.is_empty()).then(|| Value::Object(data))
            }
            Self::Mcp(McpError::UnknownProvider { name, available }) => Some(json!({
                "requested_provider": name,
                "available_providers": available,
            })),
            Self::Mcp(McpError::ResourceNotFound { uri, available }) => Some(json!({
                "uri": uri,
                "available_uris": available,
            })),
            Self::Mcp(McpError::UnknownPrompt { name, available }) => Some(json!({
                "name": name,
                "available_prompts": available,
            })),
            _ if code == ErrorCode::InternalError => Some(json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "detail": message,
            })),
            _ => None,
        };

        let data = if debug {
            let mut data = match data {
                Some(Value::Object(map)) => map,
                Some(other) => {
                    let mut map = serde_json::Map::new();
                    map.insert("details".into(), other);
                    map
                }
                None => serde_json::Map::new(),
            };
            data.insert("debug".into(), json!(redact_secrets(&format!("{:?}", self))));
            Some(Value::Object(data))
        } else {
            data
        };

        JsonRpcError {
            code: code.as_i32(),
            message,
            data,
        }
    }
}

/// Mask anything that looks like an API key (`sk-...`) in free text.
pub fn redact_secrets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("sk-") {
        let boundary = pos == 0
            || !rest[..pos]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 3..];
        let secret_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());

        if boundary && secret_len >= 8 {
            out.push_str("sk-***");
            rest = &after[secret_len..];
        } else {
            out.push_str("sk-");
            rest = after;
        }
    }

    out.push_str(rest);
    out
}
