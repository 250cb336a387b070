//! Static tool definitions
//!
//! Names, titles, descriptions, input schemas and behavioural hints for the
//! 22 Assistants tools. Arguments are snake_case like the backend API.

use serde_json::{json, Map, Value};

use crate::mcp::types::{Tool, ToolAnnotations};

/// Behaviour class used to derive annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Read,
    Create,
    Update,
    Delete,
    Action,
}

impl Kind {
    fn annotations(self) -> ToolAnnotations {
        ToolAnnotations {
            read_only_hint: self == Kind::Read,
            destructive_hint: matches!(self, Kind::Delete | Kind::Action),
            idempotent_hint: matches!(self, Kind::Read | Kind::Update | Kind::Delete),
            open_world_hint: true,
        }
    }
}

/// All tool definitions in listing order
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        // Assistants
        tool_def("assistant-create", "Create Assistant", "Create a new assistant with a model, instructions and tools", Kind::Create, assistant_create_schema()),
        tool_def("assistant-list", "List Assistants", "List assistants, newest first by default", Kind::Read, list_schema(&[], "asst_abc123")),
        tool_def("assistant-get", "Get Assistant", "Retrieve an assistant by id", Kind::Read, ids_schema(&[ASSISTANT_ID])),
        tool_def("assistant-update", "Update Assistant", "Modify an assistant's model, instructions, tools or metadata", Kind::Update, assistant_update_schema()),
        tool_def("assistant-delete", "Delete Assistant", "Permanently delete an assistant", Kind::Delete, ids_schema(&[ASSISTANT_ID])),
        // Threads
        tool_def("thread-create", "Create Thread", "Create a conversation thread, optionally seeded with messages", Kind::Create, thread_create_schema()),
        tool_def("thread-get", "Get Thread", "Retrieve a thread by id", Kind::Read, ids_schema(&[THREAD_ID])),
        tool_def("thread-update", "Update Thread", "Modify a thread's metadata or tool resources", Kind::Update, thread_update_schema()),
        tool_def("thread-delete", "Delete Thread", "Permanently delete a thread and its messages", Kind::Delete, ids_schema(&[THREAD_ID])),
        // Messages
        tool_def("message-create", "Create Message", "Add a message to a thread", Kind::Create, message_create_schema()),
        tool_def("message-list", "List Messages", "List the messages of a thread, optionally only those from one run", Kind::Read, list_schema(&[THREAD_ID, ("run_id", "Only return messages created by this run", "run_abc123", false)], "msg_abc123")),
        tool_def("message-get", "Get Message", "Retrieve one message of a thread", Kind::Read, ids_schema(&[THREAD_ID, MESSAGE_ID])),
        tool_def("message-update", "Update Message", "Modify a message's metadata", Kind::Update, with_metadata(ids_schema(&[THREAD_ID, MESSAGE_ID]))),
        tool_def("message-delete", "Delete Message", "Delete a message from a thread", Kind::Delete, ids_schema(&[THREAD_ID, MESSAGE_ID])),
        // Runs
        tool_def("run-create", "Create Run", "Start a run of an assistant on a thread", Kind::Action, run_create_schema()),
        tool_def("run-list", "List Runs", "List the runs of a thread", Kind::Read, list_schema(&[THREAD_ID], "run_abc123")),
        tool_def("run-get", "Get Run", "Retrieve a run, including its status and any required action", Kind::Read, ids_schema(&[THREAD_ID, RUN_ID])),
        tool_def("run-update", "Update Run", "Modify a run's metadata", Kind::Update, with_metadata(ids_schema(&[THREAD_ID, RUN_ID]))),
        tool_def("run-cancel", "Cancel Run", "Cancel a run that is queued or in progress", Kind::Action, ids_schema(&[THREAD_ID, RUN_ID])),
        tool_def("run-submit-tool-outputs", "Submit Tool Outputs", "Submit outputs for the tool calls of a run with status requires_action", Kind::Action, submit_tool_outputs_schema()),
        // Run steps
        tool_def("run-step-list", "List Run Steps", "List the steps of a run", Kind::Read, list_schema(&[THREAD_ID, RUN_ID], "step_abc123")),
        tool_def("run-step-get", "Get Run Step", "Retrieve one step of a run", Kind::Read, ids_schema(&[THREAD_ID, RUN_ID, STEP_ID])),
    ]
}

fn tool_def(name: &str, title: &str, description: &str, kind: Kind, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(kind.annotations()),
    }
}

// ==================== Shared fragments ====================

/// (field, description, example, required)
type IdField = (&'static str, &'static str, &'static str, bool);

const ASSISTANT_ID: IdField = ("assistant_id", "Assistant id", "asst_abc123", true);
const THREAD_ID: IdField = ("thread_id", "Thread id", "thread_abc123", true);
const MESSAGE_ID: IdField = ("message_id", "Message id", "msg_abc123", true);
const RUN_ID: IdField = ("run_id", "Run id", "run_abc123", true);
const STEP_ID: IdField = ("step_id", "Run step id", "step_abc123", true);

fn id_property(description: &str, example: &str) -> Value {
    let prefix = example.trim_end_matches("abc123");
    json!({
        "type": "string",
        "pattern": format!("^{}[A-Za-z0-9]+$", prefix),
        "description": format!("{} (e.g. {})", description, example)
    })
}

fn ids_schema(fields: &[IdField]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (field, description, example, is_required) in fields {
        properties.insert(field.to_string(), id_property(description, example));
        if *is_required {
            required.push(json!(field));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn insert_properties(mut schema: Value, extra: Value) -> Value {
    if let (Some(properties), Value::Object(extra)) = (
        schema.get_mut("properties").and_then(Value::as_object_mut),
        extra,
    ) {
        properties.extend(extra);
    }
    schema
}

fn with_metadata(schema: Value) -> Value {
    insert_properties(schema, json!({ "metadata": metadata_schema() }))
}

fn list_schema(fields: &[IdField], cursor_example: &str) -> Value {
    insert_properties(
        ids_schema(fields),
        json!({
            "limit": {
                "type": "integer",
                "minimum": 1,
                "maximum": 100,
                "description": "Number of objects to return (1-100, default 20)"
            },
            "order": {
                "type": "string",
                "enum": ["asc", "desc"],
                "description": "Sort by created_at"
            },
            "after": {
                "type": "string",
                "description": format!("Return objects after this id (e.g. {})", cursor_example)
            },
            "before": {
                "type": "string",
                "description": format!("Return objects before this id (e.g. {})", cursor_example)
            }
        }),
    )
}

fn metadata_schema() -> Value {
    json!({
        "type": "object",
        "maxProperties": 16,
        "additionalProperties": {"type": "string", "maxLength": 512},
        "description": "Up to 16 string key-value pairs (keys up to 64 characters)"
    })
}

fn tools_schema() -> Value {
    json!({
        "type": "array",
        "maxItems": 128,
        "items": {
            "type": "object",
            "properties": {
                "type": {
                    "type": "string",
                    "enum": ["code_interpreter", "file_search", "function"]
                },
                "function": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "pattern": "^[A-Za-z0-9_-]{1,64}$"},
                        "description": {"type": "string"},
                        "parameters": {"type": "object"},
                        "strict": {"type": "boolean"}
                    },
                    "required": ["name"]
                }
            },
            "required": ["type"]
        },
        "description": "Tools enabled for the assistant or run"
    })
}

fn message_content_schema() -> Value {
    json!({
        "oneOf": [
            {"type": "string", "minLength": 1},
            {"type": "array", "minItems": 1, "items": {"type": "object", "required": ["type"]}}
        ],
        "description": "Text, or an array of content parts"
    })
}

fn message_object_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "role": {"type": "string", "enum": ["user", "assistant"]},
            "content": message_content_schema(),
            "attachments": {"type": "array", "items": {"type": "object"}},
            "metadata": metadata_schema()
        },
        "required": ["role", "content"]
    })
}

fn sampling_properties() -> Value {
    json!({
        "temperature": {
            "type": "number",
            "minimum": 0,
            "maximum": 2,
            "description": "Sampling temperature"
        },
        "top_p": {
            "type": "number",
            "minimum": 0,
            "maximum": 1,
            "description": "Nucleus sampling mass"
        },
        "response_format": {
            "description": "\"auto\" or a response format object"
        }
    })
}

// ==================== Per-tool schemas ====================

fn assistant_properties() -> Value {
    insert_properties(
        json!({
            "type": "object",
            "properties": {
                "model": {
                    "type": "string",
                    "description": "Model id, e.g. gpt-4o"
                },
                "name": {
                    "type": "string",
                    "maxLength": 256,
                    "description": "Assistant name"
                },
                "description": {
                    "type": "string",
                    "maxLength": 512,
                    "description": "Assistant description"
                },
                "instructions": {
                    "type": "string",
                    "maxLength": 256000,
                    "description": "System instructions"
                },
                "tools": tools_schema(),
                "tool_resources": {
                    "type": "object",
                    "description": "Resources for code_interpreter and file_search"
                },
                "metadata": metadata_schema()
            }
        }),
        sampling_properties(),
    )
}

fn assistant_create_schema() -> Value {
    assistant_properties().tap_required(&["model"])
}

fn assistant_update_schema() -> Value {
    insert_properties(
        assistant_properties(),
        json!({ "assistant_id": id_property("Assistant id", "asst_abc123") }),
    )
    .tap_required(&["assistant_id"])
}

fn thread_create_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "messages": {
                "type": "array",
                "items": message_object_schema(),
                "description": "Initial messages"
            },
            "tool_resources": {
                "type": "object",
                "description": "Resources for code_interpreter and file_search"
            },
            "metadata": metadata_schema()
        },
        "required": []
    })
}

fn thread_update_schema() -> Value {
    insert_properties(
        with_metadata(ids_schema(&[THREAD_ID])),
        json!({
            "tool_resources": {
                "type": "object",
                "description": "Resources for code_interpreter and file_search"
            }
        }),
    )
}

fn message_create_schema() -> Value {
    insert_properties(
        ids_schema(&[THREAD_ID]),
        json!({
            "role": {
                "type": "string",
                "enum": ["user", "assistant"],
                "description": "Author of the message"
            },
            "content": message_content_schema(),
            "attachments": {
                "type": "array",
                "items": {"type": "object"},
                "description": "Files attached to the message"
            },
            "metadata": metadata_schema()
        }),
    )
    .tap_required(&["thread_id", "role", "content"])
}

fn run_create_schema() -> Value {
    let schema = insert_properties(
        ids_schema(&[THREAD_ID, ASSISTANT_ID]),
        json!({
            "model": {
                "type": "string",
                "description": "Override the assistant's model"
            },
            "instructions": {
                "type": "string",
                "description": "Override the assistant's instructions"
            },
            "additional_instructions": {
                "type": "string",
                "description": "Appended to the instructions for this run only"
            },
            "additional_messages": {
                "type": "array",
                "items": message_object_schema(),
                "description": "Messages added to the thread before the run starts"
            },
            "tools": tools_schema(),
            "metadata": metadata_schema(),
            "max_prompt_tokens": {
                "type": "integer",
                "minimum": 256,
                "description": "Prompt token budget across the run"
            },
            "max_completion_tokens": {
                "type": "integer",
                "minimum": 256,
                "description": "Completion token budget across the run"
            },
            "truncation_strategy": {
                "type": "object",
                "description": "How the thread is truncated before the run"
            },
            "tool_choice": {
                "description": "\"none\", \"auto\", \"required\" or a specific tool"
            },
            "parallel_tool_calls": {
                "type": "boolean",
                "description": "Allow parallel function calls"
            }
        }),
    );
    insert_properties(schema, sampling_properties())
}

fn submit_tool_outputs_schema() -> Value {
    insert_properties(
        ids_schema(&[THREAD_ID, RUN_ID]),
        json!({
            "tool_outputs": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "tool_call_id": {"type": "string", "pattern": "^call_[A-Za-z0-9]+$"},
                        "output": {"type": "string"}
                    },
                    "required": ["tool_call_id", "output"]
                },
                "description": "One output per pending tool call"
            }
        }),
    )
    .tap_required(&["thread_id", "run_id", "tool_outputs"])
}

trait SchemaExt {
    fn tap_required(self, required: &[&str]) -> Value;
}

impl SchemaExt for Value {
    fn tap_required(mut self, required: &[&str]) -> Value {
        self["required"] = json!(required);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_twenty_two_unique_tools() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 22);
        let names: HashSet<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), 22);
    }

    #[test]
    fn test_schemas_are_objects_with_required_lists() {
        for tool in tool_definitions() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.input_schema["properties"].is_object(), "{}", tool.name);
            assert!(tool.input_schema["required"].is_array(), "{}", tool.name);
        }
    }

    #[test]
    fn test_annotations() {
        let tools = tool_definitions();
        let find = |name: &str| {
            tools
                .iter()
                .find(|t| t.name == name)
                .and_then(|t| t.annotations.clone())
                .unwrap()
        };
        assert!(find("assistant-list").read_only_hint);
        assert!(find("thread-delete").destructive_hint);
        assert!(find("thread-delete").idempotent_hint);
        assert!(!find("run-create").idempotent_hint);
        assert!(!find("message-create").read_only_hint);
    }

    #[test]
    fn test_required_fields() {
        let tools = tool_definitions();
        let schema = &tools.iter().find(|t| t.name == "run-step-get").unwrap().input_schema;
        assert_eq!(schema["required"], json!(["thread_id", "run_id", "step_id"]));
        let schema = &tools.iter().find(|t| t.name == "assistant-create").unwrap().input_schema;
        assert_eq!(schema["required"], json!(["model"]));
    }
}
