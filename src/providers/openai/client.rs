//! OpenAI Assistants API client
//!
//! Thin HTTP client over the Assistants v2 endpoints. One method per
//! endpoint; status codes are mapped onto [`ProviderError`] variants.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::openai::{API_BASE_URL, BETA_HEADER};
use crate::error::{GatewayError, ProviderError, Result};
use crate::providers::openai::types::*;

/// Connection settings for [`AssistantsClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub organization: Option<String>,
    pub project: Option<String>,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_string(),
            organization: None,
            project: None,
        }
    }
}

/// Assistants API client
#[derive(Debug, Clone)]
pub struct AssistantsClient {
    /// HTTP client
    http_client: reqwest::Client,

    settings: ClientSettings,
}

impl AssistantsClient {
    /// Create a new client
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            settings,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(&self.settings.api_key)
            .header(BETA_HEADER.0, BETA_HEADER.1);

        if let Some(org) = &self.settings.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        if let Some(project) = &self.settings.project {
            builder = builder.header("OpenAI-Project", project);
        }

        builder
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        Self::parse(response, path).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        Self::parse(response, path).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::DELETE, path).send().await?;
        Self::parse(response, path).await
    }

    /// Decode a success body or map the failure status
    async fn parse<T: DeserializeOwned>(response: Response, path: &str) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let text = response.text().await.unwrap_or_default();
        let message = api_error_message(&text).unwrap_or(text);

        tracing::debug!(%status, path, "backend request failed");

        Err(GatewayError::Provider(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized { message },
            StatusCode::NOT_FOUND => ProviderError::NotFound {
                message: format!("{} ({})", message, path),
            },
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(1),
            },
            _ => ProviderError::RequestFailed {
                status: status.as_u16(),
                message,
            },
        }))
    }

    // ==================== Assistants ====================

    pub async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.post("/assistants", request).await
    }

    pub async fn list_assistants(&self, query: &ListQuery) -> Result<ListResponse<Assistant>> {
        self.get(&format!("/assistants{}", query.to_query_string())).await
    }

    pub async fn get_assistant(&self, assistant_id: &str) -> Result<Assistant> {
        self.get(&format!("/assistants/{}", enc(assistant_id))).await
    }

    pub async fn update_assistant(
        &self,
        assistant_id: &str,
        request: &UpdateAssistantRequest,
    ) -> Result<Assistant> {
        self.post(&format!("/assistants/{}", enc(assistant_id)), request).await
    }

    pub async fn delete_assistant(&self, assistant_id: &str) -> Result<DeletionStatus> {
        self.delete(&format!("/assistants/{}", enc(assistant_id))).await
    }

    // ==================== Threads ====================

    pub async fn create_thread(&self, request: &CreateThreadRequest) -> Result<Thread> {
        self.post("/threads", request).await
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        self.get(&format!("/threads/{}", enc(thread_id))).await
    }

    pub async fn update_thread(&self, thread_id: &str, request: &UpdateThreadRequest) -> Result<Thread> {
        self.post(&format!("/threads/{}", enc(thread_id)), request).await
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus> {
        self.delete(&format!("/threads/{}", enc(thread_id))).await
    }

    // ==================== Messages ====================

    fn messages_path(thread_id: &str) -> String {
        format!("/threads/{}/messages", enc(thread_id))
    }

    pub async fn create_message(&self, thread_id: &str, request: &CreateMessageRequest) -> Result<Message> {
        self.post(&Self::messages_path(thread_id), request).await
    }

    pub async fn list_messages(&self, thread_id: &str, query: &ListQuery) -> Result<ListResponse<Message>> {
        self.get(&format!("{}{}", Self::messages_path(thread_id), query.to_query_string()))
            .await
    }

    pub async fn get_message(&self, thread_id: &str, message_id: &str) -> Result<Message> {
        self.get(&format!("{}/{}", Self::messages_path(thread_id), enc(message_id)))
            .await
    }

    pub async fn update_message(
        &self,
        thread_id: &str,
        message_id: &str,
        request: &UpdateMessageRequest,
    ) -> Result<Message> {
        self.post(
            &format!("{}/{}", Self::messages_path(thread_id), enc(message_id)),
            request,
        )
        .await
    }

    pub async fn delete_message(&self, thread_id: &str, message_id: &str) -> Result<DeletionStatus> {
        self.delete(&format!("{}/{}", Self::messages_path(thread_id), enc(message_id)))
            .await
    }

    // ==================== Runs ====================

    fn runs_path(thread_id: &str) -> String {
        format!("/threads/{}/runs", enc(thread_id))
    }

    pub async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run> {
        self.post(&Self::runs_path(thread_id), request).await
    }

    pub async fn list_runs(&self, thread_id: &str, query: &ListQuery) -> Result<ListResponse<Run>> {
        self.get(&format!("{}{}", Self::runs_path(thread_id), query.to_query_string()))
            .await
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(&format!("{}/{}", Self::runs_path(thread_id), enc(run_id))).await
    }

    pub async fn update_run(&self, thread_id: &str, run_id: &str, request: &UpdateRunRequest) -> Result<Run> {
        self.post(&format!("{}/{}", Self::runs_path(thread_id), enc(run_id)), request)
            .await
    }

    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.post(
            &format!("{}/{}/cancel", Self::runs_path(thread_id), enc(run_id)),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: &SubmitToolOutputsRequest,
    ) -> Result<Run> {
        self.post(
            &format!("{}/{}/submit_tool_outputs", Self::runs_path(thread_id), enc(run_id)),
            request,
        )
        .await
    }

    // ==================== Run steps ====================

    pub async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
        query: &ListQuery,
    ) -> Result<ListResponse<RunStep>> {
        self.get(&format!(
            "{}/{}/steps{}",
            Self::runs_path(thread_id),
            enc(run_id),
            query.to_query_string()
        ))
        .await
    }

    pub async fn get_run_step(&self, thread_id: &str, run_id: &str, step_id: &str) -> Result<RunStep> {
        self.get(&format!(
            "{}/{}/steps/{}",
            Self::runs_path(thread_id),
            enc(run_id),
            enc(step_id)
        ))
        .await
    }

    /// Cheap authenticated call used for connection checks
    pub async fn ping(&self) -> Result<()> {
        let query = ListQuery {
            limit: Some(1),
            ..ListQuery::default()
        };
        self.list_assistants(&query).await.map(|_| ())
    }
}

fn enc(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Pull `error.message` out of an API error body
fn api_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
