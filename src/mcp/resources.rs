//! Static resource catalog
//!
//! Assistant configuration templates plus short reference documents. The
//! tool reference is generated from the tool definitions so it never drifts.

use serde_json::json;

use crate::error::{McpError, Result};
use crate::mcp::tools::tool_definitions;
use crate::mcp::types::{Resource, ResourceContent};

const JSON: &str = "application/json";
const MARKDOWN: &str = "text/markdown";

struct Entry {
    uri: &'static str,
    name: &'static str,
    description: &'static str,
    mime_type: &'static str,
}

const CATALOG: &[Entry] = &[
    Entry {
        uri: "assistant://templates/coding-assistant",
        name: "Coding assistant template",
        description: "assistant-create arguments for a code review and debugging assistant",
        mime_type: JSON,
    },
    Entry {
        uri: "assistant://templates/data-analyst",
        name: "Data analyst template",
        description: "assistant-create arguments for an analyst using code_interpreter",
        mime_type: JSON,
    },
    Entry {
        uri: "assistant://templates/customer-support",
        name: "Customer support template",
        description: "assistant-create arguments for a support agent using file_search",
        mime_type: JSON,
    },
    Entry {
        uri: "assistant://docs/tool-reference",
        name: "Tool reference",
        description: "Every tool with its required arguments",
        mime_type: MARKDOWN,
    },
    Entry {
        uri: "assistant://docs/run-lifecycle",
        name: "Run lifecycle",
        description: "Run statuses and how to drive a run to completion",
        mime_type: MARKDOWN,
    },
    Entry {
        uri: "assistant://docs/identifiers",
        name: "Identifier formats",
        description: "Id prefixes accepted by each tool argument",
        mime_type: MARKDOWN,
    },
];

const RUN_LIFECYCLE: &str = "\
# Run lifecycle

1. `run-create` starts a run in status `queued`.
2. Poll `run-get` while the status is `queued` or `in_progress`.
3. `requires_action`: read `required_action.submit_tool_outputs.tool_calls`,
   execute each call and send the results with `run-submit-tool-outputs`.
4. Terminal statuses: `completed`, `failed`, `cancelled`, `expired`,
   `incomplete`. Read the reply with `message-list` (order `desc`, filter by
   `run_id`).
5. `run-cancel` moves an active run to `cancelling`, then `cancelled`.

Use `run-step-list` to see what a run did step by step.
";

const IDENTIFIERS: &str = "\
# Identifier formats

| Argument | Prefix | Example |
|----------|--------|---------|
| assistant_id | `asst_` | asst_abc123 |
| thread_id | `thread_` | thread_abc123 |
| message_id | `msg_` | msg_abc123 |
| run_id | `run_` | run_abc123 |
| step_id | `step_` | step_abc123 |
| tool_call_id | `call_` | call_abc123 |

The part after the prefix is alphanumeric.
";

/// Catalog entries in listing order
pub fn list_resources() -> Vec<Resource> {
    CATALOG
        .iter()
        .map(|entry| Resource {
            uri: entry.uri.to_string(),
            name: entry.name.to_string(),
            description: Some(entry.description.to_string()),
            mime_type: Some(entry.mime_type.to_string()),
        })
        .collect()
}

pub fn resource_uris() -> Vec<String> {
    CATALOG.iter().map(|entry| entry.uri.to_string()).collect()
}

/// Contents of one resource
pub fn read_resource(uri: &str) -> Result<ResourceContent> {
    let entry = CATALOG
        .iter()
        .find(|entry| entry.uri == uri)
        .ok_or_else(|| McpError::ResourceNotFound {
            uri: uri.to_string(),
            available: resource_uris(),
        })?;

    let text = match entry.uri {
        "assistant://templates/coding-assistant" => serde_json::to_string_pretty(&json!({
            "model": "gpt-4o",
            "name": "Code Reviewer",
            "instructions": "You review code for correctness and clarity. Point to the exact line, explain the problem and propose a fix.",
            "tools": [{"type": "code_interpreter"}],
            "temperature": 0.2
        }))?,
        "assistant://templates/data-analyst" => serde_json::to_string_pretty(&json!({
            "model": "gpt-4o",
            "name": "Data Analyst",
            "instructions": "You analyse uploaded data files. Show the code you ran and summarise the findings in plain language.",
            "tools": [{"type": "code_interpreter"}],
            "tool_resources": {"code_interpreter": {"file_ids": []}}
        }))?,
        "assistant://templates/customer-support" => serde_json::to_string_pretty(&json!({
            "model": "gpt-4o-mini",
            "name": "Support Agent",
            "instructions": "You answer customer questions using the attached knowledge base. Say so when the answer is not in it.",
            "tools": [{"type": "file_search"}],
            "metadata": {"team": "support"}
        }))?,
        "assistant://docs/tool-reference" => tool_reference(),
        "assistant://docs/run-lifecycle" => RUN_LIFECYCLE.to_string(),
        _ => IDENTIFIERS.to_string(),
    };

    Ok(ResourceContent {
        uri: entry.uri.to_string(),
        mime_type: Some(entry.mime_type.to_string()),
        text: Some(text),
    })
}

fn tool_reference() -> String {
    let mut doc = String::from("# Tool reference\n\n");
    for tool in tool_definitions() {
        let required: Vec<&str> = tool.input_schema["required"]
            .as_array()
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default();
        doc.push_str(&format!(
            "- `{}`: {}",
            tool.name,
            tool.description.as_deref().unwrap_or_default()
        ));
        if !required.is_empty() {
            doc.push_str(&format!(" (requires {})", required.join(", ")));
        }
        doc.push('\n');
    }
    doc
}
