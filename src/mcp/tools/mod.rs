//! Tool registry
//!
//! Maps tool names to handlers. Each category lives in its own module as an
//! enum whose variants are the tools of that category.

pub mod assistant;
pub mod definitions;
pub mod handler;
pub mod message;
pub mod run;
pub mod run_step;
pub mod thread;
pub mod validation;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::{McpError, Result};
use crate::mcp::context::RequestContext;
use crate::mcp::types::Tool;

pub use assistant::AssistantTools;
pub use definitions::tool_definitions;
pub use handler::{redact_arguments, ToolCategory, ToolHandler};
pub use message::MessageTools;
pub use run::RunTools;
pub use run_step::RunStepTools;
pub use thread::ThreadTools;

/// Registered tool counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolStats {
    pub total: usize,
    pub by_category: BTreeMap<ToolCategory, usize>,
}

/// Name -> handler lookup table
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn with_default_tools() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_batch(default_handlers())?;
        tracing::debug!(tools = registry.len(), "tool registry ready");
        Ok(registry)
    }

    /// Register one handler; names are unique
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Result<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(McpError::DuplicateTool { name }.into());
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Register handlers under their own names, stopping at the first duplicate
    pub fn register_batch<I>(&mut self, handlers: I) -> Result<()>
    where
        I: IntoIterator<Item = Arc<dyn ToolHandler>>,
    {
        for handler in handlers {
            self.register(handler.tool_name(), handler)?;
        }
        Ok(())
    }

    pub async fn execute(&self, name: &str, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let handler = self.handlers.get(name).ok_or_else(|| McpError::UnknownTool {
            name: name.to_string(),
        })?;
        handler.handle(ctx, args).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Sorted tool names
    pub fn registered_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn stats(&self) -> ToolStats {
        let mut by_category = BTreeMap::new();
        for handler in self.handlers.values() {
            *by_category.entry(handler.category()).or_insert(0) += 1;
        }
        ToolStats {
            total: self.handlers.len(),
            by_category,
        }
    }

    /// Static definitions served by `tools/list`
    pub fn definitions(&self) -> Vec<Tool> {
        tool_definitions()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn default_handlers() -> Vec<Arc<dyn ToolHandler>> {
    let mut handlers: Vec<Arc<dyn ToolHandler>> = Vec::new();
    handlers.extend(AssistantTools::ALL.map(|t| Arc::new(t) as Arc<dyn ToolHandler>));
    handlers.extend(ThreadTools::ALL.map(|t| Arc::new(t) as Arc<dyn ToolHandler>));
    handlers.extend(MessageTools::ALL.map(|t| Arc::new(t) as Arc<dyn ToolHandler>));
    handlers.extend(RunTools::ALL.map(|t| Arc::new(t) as Arc<dyn ToolHandler>));
    handlers.extend(RunStepTools::ALL.map(|t| Arc::new(t) as Arc<dyn ToolHandler>));
    handlers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, GatewayError, ProviderError};
    use crate::mcp::types::RequestId;
    use crate::providers::mock::MockProvider;
    use crate::providers::ProviderCapabilities;
    use serde_json::{json, Map};

    fn sample(field: &str) -> Value {
        match field {
            "assistant_id" => json!("asst_abc123"),
            "thread_id" => json!("thread_abc123"),
            "message_id" => json!("msg_abc123"),
            "run_id" => json!("run_abc123"),
            "step_id" => json!("step_abc123"),
            "model" => json!("gpt-4o"),
            "role" => json!("user"),
            "content" => json!("Hello"),
            "tool_outputs" => json!([{"tool_call_id": "call_abc123", "output": "ok"}]),
            other => panic!("no sample for required field '{}'", other),
        }
    }

    fn minimal_args(tool: &Tool) -> Value {
        let mut args = Map::new();
        if let Some(required) = tool.input_schema["required"].as_array() {
            for field in required.iter().filter_map(Value::as_str) {
                args.insert(field.to_string(), sample(field));
            }
        }
        Value::Object(args)
    }

    fn context(mock: Arc<MockProvider>, tool: &str) -> RequestContext {
        RequestContext::new("mock", mock, tool, RequestId::Number(1))
    }

    #[test]
    fn test_definitions_match_handlers() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let mut defined: Vec<String> = tool_definitions().into_iter().map(|t| t.name).collect();
        defined.sort();
        assert_eq!(registry.registered_tools(), defined);
        assert_eq!(registry.len(), 22);
    }

    #[test]
    fn test_minimal_arguments_validate_for_every_tool() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        for tool in tool_definitions() {
            let handler = registry.handlers.get(&tool.name).unwrap();
            let args = minimal_args(&tool);
            assert!(
                handler.validate(&args).is_ok(),
                "{} rejected {}: {:?}",
                tool.name,
                args,
                handler.validate(&args)
            );
        }
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register("assistant-get", Arc::new(AssistantTools::Get))
            .unwrap();
        let err = registry
            .register("assistant-get", Arc::new(AssistantTools::Get))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Mcp(McpError::DuplicateTool { .. })));

        let err = registry
            .register_batch(vec![
                Arc::new(ThreadTools::Get) as Arc<dyn ToolHandler>,
                Arc::new(AssistantTools::Get),
            ])
            .unwrap_err();
        assert!(matches!(err, GatewayError::Mcp(McpError::DuplicateTool { .. })));
        assert!(registry.contains("thread-get"));
    }

    #[test]
    fn test_stats() {
        let stats = ToolRegistry::with_default_tools().unwrap().stats();
        assert_eq!(stats.total, 22);
        assert_eq!(stats.by_category[&ToolCategory::Assistant], 5);
        assert_eq!(stats.by_category[&ToolCategory::Thread], 4);
        assert_eq!(stats.by_category[&ToolCategory::Message], 5);
        assert_eq!(stats.by_category[&ToolCategory::Run], 6);
        assert_eq!(stats.by_category[&ToolCategory::RunStep], 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_not_found() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let mock = Arc::new(MockProvider::new("mock"));
        let err = registry
            .execute("assistant-explode", &context(mock, "assistant-explode"), &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_capability_gate_runs_before_provider() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let mock = Arc::new(MockProvider::with_capabilities(
            "mock",
            ProviderCapabilities {
                threads: true,
                ..ProviderCapabilities::default()
            },
        ));
        let err = registry
            .execute(
                "assistant-delete",
                &context(mock.clone(), "assistant-delete"),
                &json!({"assistant_id": "asst_1"}),
            )
            .await
            .unwrap_err();
        match err {
            GatewayError::ToolExecution { source, .. } => assert!(matches!(
                *source,
                GatewayError::Provider(ProviderError::Unsupported { .. })
            )),
            other => panic!("unexpected error: {other}"),
        }
        assert!(mock.calls().is_empty());

        registry
            .execute("thread-create", &context(mock.clone(), "thread-create"), &json!({}))
            .await
            .unwrap();
        assert_eq!(mock.calls(), vec!["create_thread:0".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_tool_outputs_missing_output() {
        let registry = ToolRegistry::with_default_tools().unwrap();
        let mock = Arc::new(MockProvider::new("mock"));
        let err = registry
            .execute(
                "run-submit-tool-outputs",
                &context(mock.clone(), "run-submit-tool-outputs"),
                &json!({
                    "thread_id": "thread_1",
                    "run_id": "run_1",
                    "tool_outputs": [{"tool_call_id": "call_1"}]
                }),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
        assert!(mock.calls().is_empty());
    }
}
