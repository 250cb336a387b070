//! Backend provider abstraction
//!
//! A provider implements the assistant/thread/message/run operations for one
//! backend. Every operation has a default body that fails with
//! [`ProviderError::NotImplemented`], so a provider can be registered for
//! discovery before it supports anything.

pub mod declared;
pub mod openai;
pub mod registry;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};

pub use openai::types::*;
pub use registry::ProviderRegistry;

/// Feature flags a provider declares
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderCapabilities {
    pub assistants: bool,
    pub threads: bool,
    pub messages: bool,
    pub runs: bool,
    pub run_steps: bool,
    pub file_attachments: bool,
    pub function_calling: bool,
    pub code_interpreter: bool,
    pub file_search: bool,
    pub streaming: bool,
    pub custom_models: bool,
}

impl ProviderCapabilities {
    /// Everything the Assistants v2 surface offers
    pub const fn full() -> Self {
        Self {
            assistants: true,
            threads: true,
            messages: true,
            runs: true,
            run_steps: true,
            file_attachments: true,
            function_calling: true,
            code_interpreter: true,
            file_search: true,
            streaming: true,
            custom_models: true,
        }
    }
}

/// Immutable description of a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub name: String,
    pub display_name: String,
    pub version: String,
    pub capabilities: ProviderCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
}

fn not_implemented<T>(provider: &ProviderMetadata, operation: &str) -> Result<T> {
    Err(ProviderError::NotImplemented {
        provider: provider.name.clone(),
        operation: operation.to_string(),
    }
    .into())
}

/// Backend contract shared by all providers
#[async_trait]
pub trait Provider: Send + Sync {
    fn metadata(&self) -> &ProviderMetadata;

    /// Apply configuration; fails on missing or invalid settings
    async fn initialize(&mut self, config: &ProviderConfig) -> Result<()>;

    /// Whether the backend currently accepts our credentials
    async fn validate_connection(&self) -> bool;

    // ==================== Assistants ====================

    async fn create_assistant(&self, _request: CreateAssistantRequest) -> Result<Assistant> {
        not_implemented(self.metadata(), "create_assistant")
    }

    async fn list_assistants(&self, _params: ListQuery) -> Result<ListResponse<Assistant>> {
        not_implemented(self.metadata(), "list_assistants")
    }

    async fn get_assistant(&self, _assistant_id: &str) -> Result<Assistant> {
        not_implemented(self.metadata(), "get_assistant")
    }

    async fn update_assistant(
        &self,
        _assistant_id: &str,
        _request: UpdateAssistantRequest,
    ) -> Result<Assistant> {
        not_implemented(self.metadata(), "update_assistant")
    }

    async fn delete_assistant(&self, _assistant_id: &str) -> Result<DeletionStatus> {
        not_implemented(self.metadata(), "delete_assistant")
    }

    // ==================== Threads ====================

    async fn create_thread(&self, _request: CreateThreadRequest) -> Result<Thread> {
        not_implemented(self.metadata(), "create_thread")
    }

    async fn get_thread(&self, _thread_id: &str) -> Result<Thread> {
        not_implemented(self.metadata(), "get_thread")
    }

    async fn update_thread(&self, _thread_id: &str, _request: UpdateThreadRequest) -> Result<Thread> {
        not_implemented(self.metadata(), "update_thread")
    }

    async fn delete_thread(&self, _thread_id: &str) -> Result<DeletionStatus> {
        not_implemented(self.metadata(), "delete_thread")
    }

    // ==================== Messages ====================

    async fn create_message(
        &self,
        _thread_id: &str,
        _request: CreateMessageRequest,
    ) -> Result<Message> {
        not_implemented(self.metadata(), "create_message")
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        _params: ListQuery,
    ) -> Result<ListResponse<Message>> {
        not_implemented(self.metadata(), "list_messages")
    }

    async fn get_message(&self, _thread_id: &str, _message_id: &str) -> Result<Message> {
        not_implemented(self.metadata(), "get_message")
    }

    async fn update_message(
        &self,
        _thread_id: &str,
        _message_id: &str,
        _request: UpdateMessageRequest,
    ) -> Result<Message> {
        not_implemented(self.metadata(), "update_message")
    }

    async fn delete_message(&self, _thread_id: &str, _message_id: &str) -> Result<DeletionStatus> {
        not_implemented(self.metadata(), "delete_message")
    }

    // ==================== Runs ====================

    async fn create_run(&self, _thread_id: &str, _request: CreateRunRequest) -> Result<Run> {
        not_implemented(self.metadata(), "create_run")
    }

    async fn list_runs(&self, _thread_id: &str, _params: ListQuery) -> Result<ListResponse<Run>> {
        not_implemented(self.metadata(), "list_runs")
    }

    async fn get_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
        not_implemented(self.metadata(), "get_run")
    }

    async fn update_run(
        &self,
        _thread_id: &str,
        _run_id: &str,
        _request: UpdateRunRequest,
    ) -> Result<Run> {
        not_implemented(self.metadata(), "update_run")
    }

    async fn cancel_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
        not_implemented(self.metadata(), "cancel_run")
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        _request: SubmitToolOutputsRequest,
    ) -> Result<Run> {
        not_implemented(self.metadata(), "submit_tool_outputs")
    }

    // ==================== Run steps ====================

    async fn list_run_steps(
        &self,
        _thread_id: &str,
        _run_id: &str,
        _params: ListQuery,
    ) -> Result<ListResponse<RunStep>> {
        not_implemented(self.metadata(), "list_run_steps")
    }

    async fn get_run_step(&self, _thread_id: &str, _run_id: &str, _step_id: &str) -> Result<RunStep> {
        not_implemented(self.metadata(), "get_run_step")
    }
}
