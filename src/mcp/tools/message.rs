//! Message tools

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::mcp::context::RequestContext;
use crate::mcp::tools::handler::{arg, parse_args, to_json, ToolCategory, ToolHandler};
use crate::mcp::tools::validation::*;
use crate::providers::{CreateMessageRequest, ListQuery, UpdateMessageRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTools {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl MessageTools {
    pub const ALL: [Self; 5] = [Self::Create, Self::List, Self::Get, Self::Update, Self::Delete];
}

#[async_trait]
impl ToolHandler for MessageTools {
    fn tool_name(&self) -> &'static str {
        match self {
            Self::Create => "message-create",
            Self::List => "message-list",
            Self::Get => "message-get",
            Self::Update => "message-update",
            Self::Delete => "message-delete",
        }
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Message
    }

    fn validate(&self, args: &Value) -> std::result::Result<(), ValidationError> {
        require_object(args)?;
        require_id(args, "thread_id", IdKind::Thread)?;
        match self {
            Self::Create => {
                require_string(args, "role", "user")?;
                optional_enum(args, "role", MESSAGE_ROLES)?;
                check_message_content(args.get("content"), "content")?;
                optional_array_of_objects(args, "attachments", "attachments")?;
                optional_metadata(args, "metadata")
            }
            Self::List => {
                validate_list_params(args, IdKind::Message)?;
                optional_id(args, "run_id", IdKind::Run)
            }
            Self::Get | Self::Delete => require_id(args, "message_id", IdKind::Message).map(drop),
            Self::Update => {
                require_id(args, "message_id", IdKind::Message)?;
                optional_metadata(args, "metadata")
            }
        }
    }

    async fn execute(&self, ctx: &RequestContext, args: &Value) -> Result<Value> {
        let provider = ctx.provider();
        let thread_id = arg(args, "thread_id")?;
        match self {
            Self::Create => {
                let request: CreateMessageRequest = parse_args(args)?;
                to_json(provider.create_message(thread_id, request).await?)
            }
            Self::List => {
                let query: ListQuery = parse_args(args)?;
                to_json(provider.list_messages(thread_id, query).await?)
            }
            Self::Get => to_json(provider.get_message(thread_id, arg(args, "message_id")?).await?),
            Self::Update => {
                let request: UpdateMessageRequest = parse_args(args)?;
                to_json(
                    provider
                        .update_message(thread_id, arg(args, "message_id")?, request)
                        .await?,
                )
            }
            Self::Delete => to_json(
                provider
                    .delete_message(thread_id, arg(args, "message_id")?)
                    .await?,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GatewayError, ProviderError};
    use crate::mcp::types::RequestId;
    use crate::providers::mock::MockProvider;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_create_validation() {
        let base = json!({"thread_id": "thread_1", "role": "user", "content": "Hello"});
        assert!(MessageTools::Create.validate(&base).is_ok());

        let err = MessageTools::Create
            .validate(&json!({"thread_id": "thread_1", "role": "system", "content": "Hello"}))
            .unwrap_err();
        assert_eq!(err.parameter(), Some("role"));

        let err = MessageTools::Create
            .validate(&json!({"thread_id": "thread_1", "role": "user"}))
            .unwrap_err();
        assert_eq!(err.parameter(), Some("content"));
    }

    #[test]
    fn test_list_accepts_run_filter() {
        assert!(MessageTools::List
            .validate(&json!({"thread_id": "thread_1", "run_id": "run_1", "order": "asc"}))
            .is_ok());
        let err = MessageTools::List
            .validate(&json!({"thread_id": "thread_1", "run_id": "msg_1"}))
            .unwrap_err();
        assert_eq!(err.parameter(), Some("run_id"));
    }

    #[test]
    fn test_thread_id_required_for_every_message_tool() {
        for tool in MessageTools::ALL {
            let err = tool.validate(&json!({})).unwrap_err();
            assert_eq!(err.parameter(), Some("thread_id"), "{}", tool.tool_name());
        }
    }

    #[tokio::test]
    async fn test_unimplemented_operation_names_provider() {
        let mock = Arc::new(MockProvider::new("mock"));
        let ctx = RequestContext::new("mock", mock, "message-get", RequestId::Number(1));
        let err = MessageTools::Get
            .handle(&ctx, &json!({"thread_id": "thread_1", "message_id": "msg_1"}))
            .await
            .unwrap_err();
        match err {
            GatewayError::ToolExecution { source, .. } => assert!(matches!(
                *source,
                GatewayError::Provider(ProviderError::NotImplemented { .. })
            )),
            other => panic!("unexpected error: {other}"),
        }
    }
}
