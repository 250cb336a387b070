//! In-memory provider for unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};
use crate::providers::*;

/// Answers every call with a canned object echoing the requested ids and
/// records the operations it saw.
pub struct MockProvider {
    metadata: ProviderMetadata,
    calls: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
}

impl MockProvider {
    pub fn new(name: &str) -> Self {
        Self::with_capabilities(name, ProviderCapabilities::full())
    }

    pub fn with_capabilities(name: &str, capabilities: ProviderCapabilities) -> Self {
        Self {
            metadata: ProviderMetadata {
                name: name.to_string(),
                display_name: name.to_string(),
                version: "test".to_string(),
                capabilities,
                config_schema: None,
            },
            calls: Mutex::new(Vec::new()),
            delays: HashMap::new(),
        }
    }

    /// Delay responses for a given id
    pub fn with_delay(mut self, id: &str, delay: Duration) -> Self {
        self.delays.insert(id.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pause(&self, id: &str) {
        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
    }
}

pub fn assistant(id: &str) -> Assistant {
    Assistant {
        id: id.to_string(),
        object: "assistant".into(),
        created_at: 1_700_000_000,
        name: Some("Mock".into()),
        description: None,
        model: "gpt-4o".into(),
        instructions: None,
        tools: Vec::new(),
        tool_resources: None,
        metadata: Metadata::new(),
        temperature: None,
        top_p: None,
        response_format: None,
    }
}

pub fn run(thread_id: &str, run_id: &str, status: RunStatus) -> Run {
    Run {
        id: run_id.to_string(),
        object: "thread.run".into(),
        created_at: 1_700_000_000,
        thread_id: thread_id.to_string(),
        assistant_id: "asst_mock".into(),
        status,
        required_action: None,
        last_error: None,
        model: None,
        instructions: None,
        tools: Vec::new(),
        metadata: Metadata::new(),
        usage: None,
        started_at: None,
        completed_at: None,
        cancelled_at: None,
        failed_at: None,
        expires_at: None,
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn initialize(&mut self, _config: &ProviderConfig) -> Result<()> {
        Ok(())
    }

    async fn validate_connection(&self) -> bool {
        true
    }

    async fn create_assistant(&self, request: CreateAssistantRequest) -> Result<Assistant> {
        self.record(format!("create_assistant:{}", request.model));
        let mut created = assistant("asst_created");
        created.model = request.model;
        created.name = request.name;
        Ok(created)
    }

    async fn list_assistants(&self, params: ListQuery) -> Result<ListResponse<Assistant>> {
        self.record(format!("list_assistants:{:?}", params.limit));
        Ok(ListResponse {
            object: "list".into(),
            data: vec![assistant("asst_one"), assistant("asst_two")],
            first_id: Some("asst_one".into()),
            last_id: Some("asst_two".into()),
            has_more: false,
        })
    }

    async fn get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.record(format!("get_assistant:{}", assistant_id));
        self.pause(assistant_id).await;
        if assistant_id == "asst_missing" {
            return Err(ProviderError::NotFound {
                message: format!("No assistant found with id '{}'", assistant_id),
            }
            .into());
        }
        Ok(assistant(assistant_id))
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<DeletionStatus> {
        self.record(format!("delete_assistant:{}", assistant_id));
        Ok(DeletionStatus {
            id: assistant_id.to_string(),
            object: "assistant.deleted".into(),
            deleted: true,
        })
    }

    async fn create_thread(&self, request: CreateThreadRequest) -> Result<Thread> {
        self.record(format!(
            "create_thread:{}",
            request.messages.map(|m| m.len()).unwrap_or(0)
        ));
        Ok(Thread {
            id: "thread_created".into(),
            object: "thread".into(),
            created_at: 1_700_000_000,
            tool_resources: None,
            metadata: request.metadata.unwrap_or_default(),
        })
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.record(format!("cancel_run:{}:{}", thread_id, run_id));
        Ok(run(thread_id, run_id, RunStatus::Cancelling))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> Result<Run> {
        self.record(format!(
            "submit_tool_outputs:{}:{}:{}",
            thread_id,
            run_id,
            request.tool_outputs.len()
        ));
        Ok(run(thread_id, run_id, RunStatus::Queued))
    }
}
