//! OpenAI Assistants provider
//!
//! The fully implemented backend: every operation maps onto one Assistants
//! v2 endpoint through [`client::AssistantsClient`].

pub mod client;
pub mod types;

use async_trait::async_trait;
use serde_json::json;

use crate::config::ProviderConfig;
use crate::error::{ConfigError, GatewayError, ProviderError, Result};
use crate::providers::{Provider, ProviderCapabilities, ProviderMetadata};

use client::{AssistantsClient, ClientSettings};
use types::*;

/// Shortest key accepted as plausibly real
pub const MIN_API_KEY_LEN: usize = 20;

/// Provider backed by the OpenAI Assistants API
pub struct OpenAiProvider {
    metadata: ProviderMetadata,
    client: Option<AssistantsClient>,
}

impl OpenAiProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: ProviderMetadata {
                name: name.into(),
                display_name: "OpenAI Assistants".to_string(),
                version: "v2".to_string(),
                capabilities: ProviderCapabilities::full(),
                config_schema: Some(config_schema()),
            },
            client: None,
        }
    }

    fn client(&self) -> Result<&AssistantsClient> {
        self.client.as_ref().ok_or_else(|| {
            GatewayError::Provider(ProviderError::InitializationFailed {
                provider: self.metadata.name.clone(),
                message: "provider used before initialize".to_string(),
            })
        })
    }
}

fn config_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "api_key": {"type": "string", "minLength": MIN_API_KEY_LEN},
            "base_url": {"type": "string", "format": "uri"},
            "organization": {"type": "string"},
            "project": {"type": "string"}
        },
        "required": ["api_key"]
    })
}

fn invalid(message: impl Into<String>) -> GatewayError {
    GatewayError::Config(ConfigError::InvalidConfig {
        message: message.into(),
    })
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    async fn initialize(&mut self, config: &ProviderConfig) -> Result<()> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                GatewayError::Config(ConfigError::MissingSetting {
                    name: format!("{}.api_key", self.metadata.name),
                })
            })?;
        if api_key.len() < MIN_API_KEY_LEN {
            return Err(invalid(format!(
                "{}.api_key is shorter than {} characters",
                self.metadata.name, MIN_API_KEY_LEN
            )));
        }

        let mut settings = ClientSettings::new(api_key);
        if let Some(base_url) = &config.base_url {
            let parsed = reqwest::Url::parse(base_url)
                .map_err(|e| invalid(format!("{}.base_url: {}", self.metadata.name, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(invalid(format!(
                    "{}.base_url must use http or https",
                    self.metadata.name
                )));
            }
            settings.base_url = base_url.clone();
        }
        settings.organization = config.organization.clone();
        settings.project = config.project.clone();

        self.client = Some(AssistantsClient::new(settings));
        Ok(())
    }

    async fn validate_connection(&self) -> bool {
        match self.client() {
            Ok(client) => match client.ping().await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(provider = %self.metadata.name, error = %e, "connection check failed");
                    false
                }
            },
            Err(_) => false,
        }
    }

    async fn create_assistant(&self, request: CreateAssistantRequest) -> Result<Assistant> {
        self.client()?.create_assistant(&request).await
    }

    async fn list_assistants(&self, params: ListQuery) -> Result<ListResponse<Assistant>> {
        self.client()?.list_assistants(&params).await
    }

    async fn get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.client()?.get_assistant(assistant_id).await
    }

    async fn update_assistant(
        &self,
        assistant_id: &str,
        request: UpdateAssistantRequest,
    ) -> Result<Assistant> {
        self.client()?.update_assistant(assistant_id, &request).await
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<DeletionStatus> {
        self.client()?.delete_assistant(assistant_id).await
    }

    async fn create_thread(&self, request: CreateThreadRequest) -> Result<Thread> {
        self.client()?.create_thread(&request).await
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        self.client()?.get_thread(thread_id).await
    }

    async fn update_thread(&self, thread_id: &str, request: UpdateThreadRequest) -> Result<Thread> {
        self.client()?.update_thread(thread_id, &request).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus> {
        self.client()?.delete_thread(thread_id).await
    }

    async fn create_message(&self, thread_id: &str, request: CreateMessageRequest) -> Result<Message> {
        self.client()?.create_message(thread_id, &request).await
    }

    async fn list_messages(&self, thread_id: &str, params: ListQuery) -> Result<ListResponse<Message>> {
        self.client()?.list_messages(thread_id, &params).await
    }

    async fn get_message(&self, thread_id: &str, message_id: &str) -> Result<Message> {
        self.client()?.get_message(thread_id, message_id).await
    }

    async fn update_message(
        &self,
        thread_id: &str,
        message_id: &str,
        request: UpdateMessageRequest,
    ) -> Result<Message> {
        self.client()?
            .update_message(thread_id, message_id, &request)
            .await
    }

    async fn delete_message(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus> {
        self.client()?.delete_message(thread_id, message_id).await
    }

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest) -> Result<Run> {
        self.client()?.create_run(thread_id, &request).await
    }

    async fn list_runs(&self, thread_id: &str, params: ListQuery) -> Result<ListResponse<Run>> {
        self.client()?.list_runs(thread_id, &params).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client()?.get_run(thread_id, run_id).await
    }

    async fn update_run(&self, thread_id: &str, run_id: &str, request: UpdateRunRequest) -> Result<Run> {
        self.client()?.update_run(thread_id, run_id, &request).await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.client()?.cancel_run(thread_id, run_id).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> Result<Run> {
        self.client()?
            .submit_tool_outputs(thread_id, run_id, &request)
            .await
    }

    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
        params: ListQuery,
    ) -> Result<ListResponse<RunStep>> {
        self.client()?
            .list_run_steps(thread_id, run_id, &params)
            .await
    }

    async fn get_run_step(&self, thread_id: &str, run_id: &str, step_id: &str) -> Result<RunStep> {
        self.client()?.get_run_step(thread_id, run_id, step_id).await
    }
}
