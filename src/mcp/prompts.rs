//! Static prompt catalog
//!
//! Each prompt renders a single user message that walks the model through a
//! common workflow using the gateway's tools.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{McpError, Result};
use crate::mcp::types::{Prompt, PromptArgument, PromptMessage, ToolResultContent};

/// `prompts/get` params
#[derive(Debug, Clone, Deserialize)]
pub struct GetPromptParams {
    pub name: String,
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

/// `prompts/get` result
#[derive(Debug, Clone, Serialize)]
pub struct GetPromptResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

struct Template {
    name: &'static str,
    description: &'static str,
    /// (name, description, required)
    arguments: &'static [(&'static str, &'static str, bool)],
    body: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        name: "create-assistant",
        description: "Design and create a new assistant",
        arguments: &[
            ("name", "Name for the assistant", true),
            ("purpose", "What the assistant should help with", true),
            ("model", "Model to use (default gpt-4o)", false),
        ],
        body: "\
Create an assistant named \"{name}\" that helps with: {purpose}.

Write focused instructions for that purpose, choose the tools it needs \
(code_interpreter, file_search or function tools) and call `assistant-create` \
with model \"{model}\". Report the new assistant id when done.",
    },
    Template {
        name: "start-conversation",
        description: "Open a thread with an assistant and get its first reply",
        arguments: &[
            ("assistant_id", "Assistant to talk to (asst_...)", true),
            ("message", "First user message", true),
        ],
        body: "\
Start a conversation with assistant {assistant_id}:

1. Call `thread-create` with one user message: \"{message}\".
2. Call `run-create` with the new thread id and assistant_id {assistant_id}.
3. Poll `run-get` until the run leaves queued/in_progress.
4. Read the reply with `message-list` (order desc, limit 1) and show it.",
    },
    Template {
        name: "handle-tool-calls",
        description: "Resolve a run that is waiting on tool outputs",
        arguments: &[
            ("thread_id", "Thread of the run (thread_...)", true),
            ("run_id", "Run in requires_action (run_...)", true),
        ],
        body: "\
Run {run_id} on thread {thread_id} is waiting for tool outputs.

Call `run-get` and read required_action.submit_tool_outputs.tool_calls. For \
each call, work out the output for its function and arguments. Then call \
`run-submit-tool-outputs` once with every tool_call_id and its output, and \
poll `run-get` until the run completes.",
    },
    Template {
        name: "debug-run",
        description: "Explain why a run failed or stalled",
        arguments: &[
            ("thread_id", "Thread of the run (thread_...)", true),
            ("run_id", "Run to inspect (run_...)", true),
        ],
        body: "\
Investigate run {run_id} on thread {thread_id}.

Call `run-get` for its status and last_error, then `run-step-list` to see \
each step. Summarise what happened, where it went wrong and what to change \
(instructions, tools, token limits) before retrying.",
    },
];

const DEFAULT_MODEL: &str = "gpt-4o";

pub fn list_prompts() -> Vec<Prompt> {
    TEMPLATES
        .iter()
        .map(|template| Prompt {
            name: template.name.to_string(),
            description: Some(template.description.to_string()),
            arguments: template
                .arguments
                .iter()
                .map(|(name, description, required)| PromptArgument {
                    name: name.to_string(),
                    description: Some(description.to_string()),
                    required: *required,
                })
                .collect(),
        })
        .collect()
}

pub fn prompt_names() -> Vec<String> {
    TEMPLATES.iter().map(|t| t.name.to_string()).collect()
}

/// Render a prompt with its arguments substituted
pub fn get_prompt(params: &GetPromptParams) -> Result<GetPromptResult> {
    let template = TEMPLATES
        .iter()
        .find(|t| t.name == params.name)
        .ok_or_else(|| McpError::UnknownPrompt {
            name: params.name.clone(),
            available: prompt_names(),
        })?;

    let mut text = template.body.to_string();
    for (name, _, required) in template.arguments {
        let value = match params.arguments.get(*name).filter(|v| !v.trim().is_empty()) {
            Some(value) => value.as_str(),
            None if *required => {
                return Err(McpError::InvalidParams {
                    message: format!(
                        "prompt '{}' requires argument '{}'",
                        template.name, name
                    ),
                }
                .into())
            }
            None if *name == "model" => DEFAULT_MODEL,
            None => "",
        };
        text = text.replace(&format!("{{{}}}", name), value);
    }

    Ok(GetPromptResult {
        description: Some(template.description.to_string()),
        messages: vec![PromptMessage {
            role: "user".to_string(),
            content: ToolResultContent::Text { text },
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn params(name: &str, args: &[(&str, &str)]) -> GetPromptParams {
        GetPromptParams {
            name: name.to_string(),
            arguments: args
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn text_of(result: &GetPromptResult) -> &str {
        match &result.messages[0].content {
            ToolResultContent::Text { text } => text,
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_substitution_and_default_model() {
        let result = get_prompt(&params(
            "create-assistant",
            &[("name", "Tutor"), ("purpose", "algebra homework")],
        ))
        .unwrap();
        let text = text_of(&result);
        assert!(text.contains("\"Tutor\""));
        assert!(text.contains("algebra homework"));
        assert!(text.contains("gpt-4o"));
        assert!(!text.contains('{'));
    }

    #[test]
    fn test_missing_required_argument() {
        let err = get_prompt(&params("debug-run", &[("thread_id", "thread_1")])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
        assert!(err.to_string().contains("run_id"));
    }

    #[test]
    fn test_unknown_prompt_lists_available() {
        let err = get_prompt(&params("nope", &[])).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParams);
        let data = err.to_rpc_error(false).data.unwrap();
        assert_eq!(data["available_prompts"].as_array().unwrap().len(), TEMPLATES.len());
    }

    #[test]
    fn test_every_prompt_renders_with_its_arguments() {
        for prompt in list_prompts() {
            let args: Vec<(String, String)> = prompt
                .arguments
                .iter()
                .map(|a| (a.name.clone(), "x".to_string()))
                .collect();
            let params = GetPromptParams {
                name: prompt.name.clone(),
                arguments: args.into_iter().collect(),
            };
            let result = get_prompt(&params).unwrap();
            assert!(!text_of(&result).contains("{"), "{}", prompt.name);
        }
    }
}
