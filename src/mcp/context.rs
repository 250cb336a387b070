//! Per-call request context
//!
//! Built fresh for every `tools/call` and handed to the handler by
//! reference, so concurrent calls never see each other's provider, tool name
//! or request id.

use std::sync::Arc;

use crate::mcp::types::RequestId;
use crate::providers::Provider;

#[derive(Clone)]
pub struct RequestContext {
    provider_name: String,
    provider: Arc<dyn Provider>,
    tool_name: String,
    request_id: RequestId,
}

impl RequestContext {
    pub fn new(
        provider_name: impl Into<String>,
        provider: Arc<dyn Provider>,
        tool_name: impl Into<String>,
        request_id: RequestId,
    ) -> Self {
        Self {
            provider_name: provider_name.into(),
            provider,
            tool_name: tool_name.into(),
            request_id,
        }
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("provider", &self.provider_name)
            .field("tool", &self.tool_name)
            .field("request_id", &self.request_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;

    #[test]
    fn test_context_carries_call_identity() {
        let ctx = RequestContext::new(
            "mock",
            Arc::new(MockProvider::new("mock")),
            "thread-get",
            RequestId::String("req-7".into()),
        );
        assert_eq!(ctx.provider_name(), "mock");
        assert_eq!(ctx.tool_name(), "thread-get");
        assert_eq!(ctx.request_id(), &RequestId::String("req-7".into()));
        assert_eq!(ctx.provider().metadata().name, "mock");

        let debug = format!("{:?}", ctx);
        assert!(debug.contains("thread-get"));
        assert!(debug.contains("req-7"));
    }
}
