//! Handler strategy shared by every tool
//!
//! A handler validates its arguments, checks that the provider declares the
//! capability its category needs, and only then calls the provider. Failures
//! are logged with a redacted copy of the arguments before being returned.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{GatewayError, ProviderError, Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::providers::ProviderCapabilities;

/// Tool family, used for capability checks and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    Assistant,
    Thread,
    Message,
    Run,
    RunStep,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Thread => "thread",
            Self::Message => "message",
            Self::Run => "run",
            Self::RunStep => "run-step",
        }
    }

    /// Capability flag a provider must declare to serve this category
    pub fn capability(&self) -> &'static str {
        match self {
            Self::Assistant => "assistants",
            Self::Thread => "threads",
            Self::Message => "messages",
            Self::Run => "runs",
            Self::RunStep => "runSteps",
        }
    }

    pub fn is_supported_by(&self, capabilities: &ProviderCapabilities) -> bool {
        match self {
            Self::Assistant => capabilities.assistants,
            Self::Thread => capabilities.threads,
            Self::Message => capabilities.messages,
            Self::Run => capabilities.runs,
            Self::RunStep => capabilities.run_steps,
        }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn tool_name(&self) -> &'static str;

    fn category(&self) -> ToolCategory;

    /// Pure argument check; never touches the provider
    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError>;

    /// Call the provider; only invoked after `validate` succeeded
    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value>;

    /// Validate, check capability, execute.
    ///
    /// Non-validation failures are wrapped so the message names this tool.
    async fn handle(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        tracing::debug!(
            tool = ctx.tool_name(),
            request_id = %ctx.request_id(),
            provider = ctx.provider_name(),
            "executing tool"
        );

        let capabilities = ctx.provider().metadata().capabilities;
        let outcome = match self.validate(args) {
            Err(e) => Err(GatewayError::Validation(e)),
            Ok(()) if !self.category().is_supported_by(&capabilities) => {
                Err(GatewayError::Provider(ProviderError::Unsupported {
                    provider: ctx.provider_name().to_string(),
                    capability: self.category().capability().to_string(),
                }))
            }
            Ok(()) => self.execute(ctx, args).await,
        };

        outcome.map_err(|err| {
            let err = match err {
                GatewayError::Validation(_) | GatewayError::ToolExecution { .. } => err,
                other => GatewayError::ToolExecution {
                    tool: self.tool_name().to_string(),
                    source: Box::new(other),
                },
            };
            tracing::warn!(
                tool = self.tool_name(),
                category = self.category().as_str(),
                request_id = %ctx.request_id(),
                args = %redact_arguments(args),
                error = %err,
                "tool call failed"
            );
            err
        })
    }
}

/// Deserialize tool arguments into a typed request
pub(crate) fn parse_args<T: DeserializeOwned>(args: &Value) -> std::result::Result<T, ValidationError> {
    T::deserialize(args).map_err(|e| {
        ValidationError::invalid("arguments", e.to_string(), "see the tool's inputSchema")
    })
}

/// String argument that `validate` already guaranteed
pub(crate) fn arg<'a>(args: &'a Value, field: &str) -> std::result::Result<&'a str, ValidationError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::missing(field, format!("\"{}\": \"...\"", field)))
}

pub(crate) fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

const REDACTED: &str = "[REDACTED]";

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    ["api_key", "apikey", "secret", "password", "authorization", "credential"]
        .iter()
        .any(|needle| key.contains(needle))
        || key == "token"
        || key.ends_with("_token")
}

/// Copy of `args` safe to log: credential-like fields are masked
pub fn redact_arguments(args: &Value) -> Value {
    match args {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let value = if is_sensitive_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_arguments(value)
                    };
                    (key.clone(), value)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_arguments).collect()),
        other => other.clone(),
    }
}
