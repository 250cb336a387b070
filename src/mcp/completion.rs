//! Argument completion (`completion/complete`)

use serde::{Deserialize, Serialize};

use crate::error::{McpError, Result};
use crate::mcp::prompts::prompt_names;
use crate::mcp::resources::resource_uris;
use crate::mcp::tools::validation::{MESSAGE_ROLES, SORT_ORDERS, TOOL_TYPES};

/// Most values returned in one completion
pub const MAX_COMPLETIONS: usize = 100;

const MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum CompletionRef {
    #[serde(rename = "ref/prompt")]
    Prompt { name: String },

    #[serde(rename = "ref/resource")]
    Resource { uri: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionArgument {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteParams {
    #[serde(rename = "ref")]
    pub reference: CompletionRef,
    pub argument: CompletionArgument,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub values: Vec<String>,
    pub total: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompleteResult {
    pub completion: Completion,
}

fn candidates(params: &CompleteParams) -> Result<Vec<String>> {
    if let CompletionRef::Prompt { name } = &params.reference {
        if !prompt_names().contains(name) {
            return Err(McpError::UnknownPrompt {
                name: name.clone(),
                available: prompt_names(),
            }
            .into());
        }
    }

    let values: &[&str] = match (&params.reference, params.argument.name.as_str()) {
        (CompletionRef::Resource { .. }, "uri") => return Ok(resource_uris()),
        (_, "model") => MODELS,
        (_, "role") => MESSAGE_ROLES,
        (_, "order") => SORT_ORDERS,
        (_, "type") => TOOL_TYPES,
        _ => &[],
    };
    Ok(values.iter().map(|v| v.to_string()).collect())
}

/// Prefix-matched suggestions, capped at [`MAX_COMPLETIONS`]
pub fn complete(params: &CompleteParams) -> Result<CompleteResult> {
    let prefix = params.argument.value.to_ascii_lowercase();
    let matches: Vec<String> = candidates(params)?
        .into_iter()
        .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&prefix))
        .collect();

    let total = matches.len();
    let values: Vec<String> = matches.into_iter().take(MAX_COMPLETIONS).collect();
    Ok(CompleteResult {
        completion: Completion {
            has_more: total > values.len(),
            values,
            total,
        },
    })
}
