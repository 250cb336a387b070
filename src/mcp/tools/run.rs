//! Run tools

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::mcp::tools::handler::{arg, parse_args, to_json, ToolCategory, ToolHandler};
use crate::mcp::tools::validation::*;
use crate::providers::{CreateRunRequest, ListQuery, SubmitToolOutputsRequest, UpdateRunRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTools {
    Create,
    List,
    Get,
    Update,
    Cancel,
    SubmitToolOutputs,
}

impl RunTools {
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::List,
        Self::Get,
        Self::Update,
        Self::Cancel,
        Self::SubmitToolOutputs,
    ];
}

fn validate_tool_choice(args: &Value) -> std::result::Result<(), ValidationError> {
    match args.get("tool_choice") {
        None | Some(Value::Null) | Some(Value::Object(_)) => Ok(()),
        Some(Value::String(_)) => optional_enum(args, "tool_choice", TOOL_CHOICES),
        Some(_) => Err(ValidationError::invalid(
            "tool_choice",
            "expected a string or object",
            r#""tool_choice": "auto""#,
        )),
    }
}

fn validate_create(args: &Value) -> std::result::Result<(), ValidationError> {
    require_id(args, "assistant_id", IdKind::Assistant)?;
    optional_string(args, "model", "gpt-4o", 256)?;
    optional_string(args, "instructions", "Answer briefly.", 256_000)?;
    optional_string(args, "additional_instructions", "Address the user as Jane.", 256_000)?;
    optional_messages(args, "additional_messages")?;
    optional_tools(args, "tools")?;
    optional_metadata(args, "metadata")?;
    optional_number_range(args, "temperature", 0.0, 2.0, "1")?;
    optional_number_range(args, "top_p", 0.0, 1.0, "1")?;
    optional_integer_range(args, "max_prompt_tokens", 256, u32::MAX as u64, "2048")?;
    optional_integer_range(args, "max_completion_tokens", 256, u32::MAX as u64, "1024")?;
    optional_object(args, "truncation_strategy", r#"{"type": "auto"}"#)?;
    validate_tool_choice(args)?;
    optional_bool(args, "parallel_tool_calls")
}

#[async_trait]
impl ToolHandler for RunTools {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::Create => "run-create",
            Self::List => "run-list",
            Self::Get => "run-get",
            Self::Update => "run-update",
            Self::Cancel => "run-cancel",
            Self::SubmitToolOutputs => "run-submit-tool-outputs",
        }
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Run
    }

    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError> {
        require_object(args)?;
        require_id(args, "thread_id", IdKind::Thread)?;
        match self {
            Self::Create => validate_create(args),
            Self::List => validate_list_params(args, IdKind::Run),
            Self::Get | Self::Cancel => require_id(args, "run_id", IdKind::Run).map(drop),
            Self::Update => {
                require_id(args, "run_id", IdKind::Run)?;
                optional_metadata(args, "metadata")
            }
            Self::SubmitToolOutputs => {
                require_id(args, "run_id", IdKind::Run)?;
                validate_tool_outputs(args, "tool_outputs")
            }
        }
    }

    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let provider = ctx.provider();
        let thread_id = arg(args, "thread_id")?;
        match self {
            Self::Create => {
                let request: CreateRunRequest = parse_args(args)?;
                to_json(provider.create_run(thread_id, request).await?)
            }
            Self::List => {
                let query: ListQuery = parse_args(args)?;
                to_json(provider.list_runs(thread_id, query).await?)
            }
            Self::Get => to_json(provider.get_run(thread_id, arg(args, "run_id")?).await?),
            Self::Update => {
                let request: UpdateRunRequest = parse_args(args)?;
                to_json(provider.update_run(thread_id, arg(args, "run_id")?, request).await?)
            }
            Self::Cancel => to_json(provider.cancel_run(thread_id, arg(args, "run_id")?).await?),
            Self::SubmitToolOutputs => {
                let request: SubmitToolOutputsRequest = parse_args(args)?;
                to_json(
                    provider
                        .submit_tool_outputs(thread_id, arg(args, "run_id")?, request)
                        .await?,
                )
            }
        }
    }
}
