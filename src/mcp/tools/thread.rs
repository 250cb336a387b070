//! Thread tools

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::mcp::tools::handler::{arg, parse_args, to_json, ToolCategory, ToolHandler};
use crate::mcp::tools::validation::*;
use crate::providers::{CreateThreadRequest, UpdateThreadRequest};

const TOOL_RESOURCES_EXAMPLE: &str = r#"{"file_search": {"vector_store_ids": ["vs_abc123"]}}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadTools {
    Create,
    Get,
    Update,
    Delete,
}

impl ThreadTools {
    pub const ALL: [Self; 4] = [Self::Create, Self::Get, Self::Update, Self::Delete];
}

#[async_trait]
impl ToolHandler for ThreadTools {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::Create => "thread-create",
            Self::Get => "thread-get",
            Self::Update => "thread-update",
            Self::Delete => "thread-delete",
        }
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Thread
    }

    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError> {
        require_object(args)?;
        match self {
            Self::Create => {
                optional_messages(args, "messages")?;
                optional_object(args, "tool_resources", TOOL_RESOURCES_EXAMPLE)?;
                optional_metadata(args, "metadata")
            }
            Self::Get | Self::Delete => require_id(args, "thread_id", IdKind::Thread).map(drop),
            Self::Update => {
                require_id(args, "thread_id", IdKind::Thread)?;
                optional_object(args, "tool_resources", TOOL_RESOURCES_EXAMPLE)?;
                optional_metadata(args, "metadata")
            }
        }
    }

    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let provider = ctx.provider();
        match self {
            Self::Create => {
                let request: CreateThreadRequest = parse_args(args)?;
                to_json(provider.create_thread(request).await?)
            }
            Self::Get => to_json(provider.get_thread(arg(args, "thread_id")?).await?),
            Self::Update => {
                let request: UpdateThreadRequest = parse_args(args)?;
                to_json(provider.update_thread(arg(args, "thread_id")?, request).await?)
            }
            Self::Delete => to_json(provider.delete_thread(arg(args, "thread_id")?).await?),
        }
    }
}
