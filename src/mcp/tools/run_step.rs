//! Run step tools

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::mcp::tools::handler::{arg, parse_args, to_json, ToolCategory, ToolHandler};
use crate::mcp::tools::validation::*;
use crate::providers::ListQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStepTools {
    List,
    Get,
}

impl RunStepTools {
    pub const ALL: [Self; 2] = [Self::List, Self::Get];
}

#[async_trait]
impl ToolHandler for RunStepTools {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::List => "run-step-list",
            Self::Get => "run-step-get",
        }
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::RunStep
    }

    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError> {
        require_object(args)?;
        require_id(args, "thread_id", IdKind::Thread)?;
        require_id(args, "run_id", IdKind::Run)?;
        match self {
            Self::List => validate_list_params(args, IdKind::RunStep),
            Self::Get => require_id(args, "step_id", IdKind::RunStep).map(drop),
        }
    }

    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let provider = ctx.provider();
        let thread_id = arg(args, "thread_id")?;
        let run_id = arg(args, "run_id")?;
        match self {
            Self::List => {
                let mut query: ListQuery = parse_args(args)?;
                // run_id is a path segment here, not a filter
                query.run_id = None;
                to_json(provider.list_run_steps(thread_id, run_id, query).await?)
            }
            Self::Get => to_json(
                provider
                    .get_run_step(thread_id, run_id, arg(args, "step_id")?)
                    .await?,
            ),
        }
    }
}
