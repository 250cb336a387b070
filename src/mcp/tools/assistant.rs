//! Assistant tools

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::mcp::tools::handler::{arg, parse_args, to_json, ToolCategory, ToolHandler};
use crate::mcp::tools::validation::*;
use crate::providers::{CreateAssistantRequest, ListQuery, UpdateAssistantRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantTools {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl AssistantTools {
    pub const ALL: [Self; 5] = [Self::Create, Self::List, Self::Get, Self::Update, Self::Delete];
}

/// Optional fields shared by create and update
fn validate_assistant_fields(args: &Value) -> std::result::Result<(), ValidationError> {
    optional_string(args, "name", "Math Tutor", 256)?;
    optional_string(args, "description", "Answers math questions", 512)?;
    optional_string(args, "instructions", "You are a personal math tutor.", 256_000)?;
    optional_tools(args, "tools")?;
    optional_object(args, "tool_resources", r#"{"code_interpreter": {"file_ids": []}}"#)?;
    optional_metadata(args, "metadata")?;
    optional_number_range(args, "temperature", 0.0, 2.0, "1")?;
    optional_number_range(args, "top_p", 0.0, 1.0, "1")
}

#[async_trait]
impl ToolHandler for AssistantTools {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::Create => "assistant-create",
            Self::List => "assistant-list",
            Self::Get => "assistant-get",
            Self::Update => "assistant-update",
            Self::Delete => "assistant-delete",
        }
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Assistant
    }

    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError> {
        require_object(args)?;
        match self {
            Self::Create => {
                require_string(args, "model", "gpt-4o")?;
                validate_assistant_fields(args)
            }
            Self::List => validate_list_params(args, IdKind::Assistant),
            Self::Get | Self::Delete => require_id(args, "assistant_id", IdKind::Assistant).map(drop),
            Self::Update => {
                require_id(args, "assistant_id", IdKind::Assistant)?;
                optional_string(args, "model", "gpt-4o", 256)?;
                validate_assistant_fields(args)
            }
        }
    }

    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let provider = ctx.provider();
        match self {
            Self::Create => {
                let request: CreateAssistantRequest = parse_args(args)?;
                to_json(provider.create_assistant(request).await?)
            }
            Self::List => {
                let query: ListQuery = parse_args(args)?;
                to_json(provider.list_assistants(query).await?)
            }
            Self::Get => to_json(provider.get_assistant(arg(args, "assistant_id")?).await?),
            Self::Update => {
                let request: UpdateAssistantRequest = parse_args(args)?;
                to_json(
                    provider
                        .update_assistant(arg(args, "assistant_id")?, request)
                        .await?,
                )
            }
            Self::Delete => to_json(provider.delete_assistant(arg(args, "assistant_id")?).await?),
        }
    }
}
