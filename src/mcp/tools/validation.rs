//! Argument validation helpers
//!
//! Every failure names the parameter (with its path for nested values) and
//! carries an example of a valid value.

use serde_json::{Map, Value};

use crate::error::ValidationError;

type Check = Result<(), ValidationError>;

/// Identifier families and their prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Assistant,
    Thread,
    Message,
    Run,
    RunStep,
    ToolCall,
}

impl IdKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Assistant => "asst_",
            Self::Thread => "thread_",
            Self::Message => "msg_",
            Self::Run => "run_",
            Self::RunStep => "step_",
            Self::ToolCall => "call_",
        }
    }

    pub fn example(&self) -> &'static str {
        match self {
            Self::Assistant => "asst_abc123",
            Self::Thread => "thread_abc123",
            Self::Message => "msg_abc123",
            Self::Run => "run_abc123",
            Self::RunStep => "step_abc123",
            Self::ToolCall => "call_abc123",
        }
    }

    /// Whether `value` is `<prefix><alphanumerics>`
    pub fn matches(&self, value: &str) -> bool {
        value
            .strip_prefix(self.prefix())
            .is_some_and(|rest| !rest.is_empty() && rest.len() <= 64 && rest.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}

pub const MESSAGE_ROLES: &[&str] = &["user", "assistant"];
pub const SORT_ORDERS: &[&str] = &["asc", "desc"];
pub const TOOL_TYPES: &[&str] = &["code_interpreter", "file_search", "function"];
pub const TOOL_CHOICES: &[&str] = &["none", "auto", "required"];

const MAX_METADATA_PAIRS: usize = 16;
const MAX_METADATA_KEY: usize = 64;
const MAX_METADATA_VALUE: usize = 512;

fn example_for(field: &str, value: &str) -> String {
    format!("\"{}\": {}", field, value)
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Arguments must be a JSON object
pub fn require_object(args: &Value) -> Result<&Map<String, Value>, ValidationError> {
    args.as_object().ok_or_else(|| {
        ValidationError::invalid(
            "arguments",
            format!("expected an object, got {}", type_name(args)),
            "{}",
        )
    })
}

/// Present, non-null field
fn present<'a>(args: &'a Value, field: &str) -> Option<&'a Value> {
    args.get(field).filter(|v| !v.is_null())
}

pub fn require_string<'a>(args: &'a Value, field: &str, example: &str) -> Result<&'a str, ValidationError> {
    let value = present(args, field)
        .ok_or_else(|| ValidationError::missing(field, example_for(field, &quoted(example))))?;
    check_non_empty_string(value, field, example)
}

pub fn optional_string<'a>(
    args: &'a Value,
    field: &str,
    example: &str,
    max_len: usize,
) -> Result<Option<&'a str>, ValidationError> {
    match present(args, field) {
        None => Ok(None),
        Some(value) => {
            let s = value.as_str().ok_or_else(|| {
                ValidationError::invalid(
                    field,
                    format!("expected a string, got {}", type_name(value)),
                    example_for(field, &quoted(example)),
                )
            })?;
            if s.chars().count() > max_len {
                return Err(ValidationError::invalid(
                    field,
                    format!("must be at most {} characters", max_len),
                    example_for(field, &quoted(example)),
                ));
            }
            Ok(Some(s))
        }
    }
}

fn check_non_empty_string<'a>(value: &'a Value, field: &str, example: &str) -> Result<&'a str, ValidationError> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        Some(_) => Err(ValidationError::invalid(
            field,
            "must not be empty",
            example_for(field, &quoted(example)),
        )),
        None => Err(ValidationError::invalid(
            field,
            format!("expected a string, got {}", type_name(value)),
            example_for(field, &quoted(example)),
        )),
    }
}

pub fn check_id(value: &str, field: &str, kind: IdKind) -> Check {
    if kind.matches(value) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            field,
            format!("expected an id starting with '{}'", kind.prefix()),
            example_for(field, &quoted(kind.example())),
        ))
    }
}

pub fn require_id<'a>(args: &'a Value, field: &str, kind: IdKind) -> Result<&'a str, ValidationError> {
    let id = require_string(args, field, kind.example())?;
    check_id(id, field, kind)?;
    Ok(id)
}

pub fn optional_id(args: &Value, field: &str, kind: IdKind) -> Check {
    if let Some(id) = optional_string(args, field, kind.example(), 128)? {
        check_id(id, field, kind)?;
    }
    Ok(())
}

pub fn optional_enum(args: &Value, field: &str, allowed: &[&str]) -> Check {
    match present(args, field) {
        None => Ok(()),
        Some(value) => check_enum(value, field, allowed),
    }
}

fn check_enum(value: &Value, field: &str, allowed: &[&str]) -> Check {
    match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(ValidationError::invalid(
            field,
            format!("must be one of: {}", allowed.join(", ")),
            example_for(field, &quoted(allowed[0])),
        )),
    }
}

pub fn optional_number_range(args: &Value, field: &str, min: f64, max: f64, example: &str) -> Check {
    match present(args, field) {
        None => Ok(()),
        Some(value) => match value.as_f64() {
            Some(n) if (min..=max).contains(&n) => Ok(()),
            _ => Err(ValidationError::invalid(
                field,
                format!("must be a number between {} and {}", min, max),
                example_for(field, example),
            )),
        },
    }
}

pub fn optional_integer_range(args: &Value, field: &str, min: u64, max: u64, example: &str) -> Check {
    match present(args, field) {
        None => Ok(()),
        Some(value) => match value.as_u64() {
            Some(n) if (min..=max).contains(&n) => Ok(()),
            _ => Err(ValidationError::invalid(
                field,
                format!("must be an integer between {} and {}", min, max),
                example_for(field, example),
            )),
        },
    }
}

pub fn optional_bool(args: &Value, field: &str) -> Check {
    match present(args, field) {
        None | Some(Value::Bool(_)) => Ok(()),
        Some(value) => Err(ValidationError::invalid(
            field,
            format!("expected a boolean, got {}", type_name(value)),
            example_for(field, "true"),
        )),
    }
}

pub fn optional_object(args: &Value, field: &str, example: &str) -> Check {
    match present(args, field) {
        None | Some(Value::Object(_)) => Ok(()),
        Some(value) => Err(ValidationError::invalid(
            field,
            format!("expected an object, got {}", type_name(value)),
            example_for(field, example),
        )),
    }
}

/// Metadata: at most 16 string pairs with bounded key and value lengths
pub fn optional_metadata(args: &Value, field: &str) -> Check {
    nested_metadata(args, field, field)
}

/// Metadata stored under `field`, reported in errors as `path`
pub fn nested_metadata(args: &Value, field: &str, path: &str) -> Check {
    let example = example_for(path, r#"{"project": "alpha"}"#);
    let map = match present(args, field) {
        None => return Ok(()),
        Some(Value::Object(map)) => map,
        Some(value) => {
            return Err(ValidationError::invalid(
                path,
                format!("expected an object, got {}", type_name(value)),
                example,
            ))
        }
    };

    if map.len() > MAX_METADATA_PAIRS {
        return Err(ValidationError::invalid(
            path,
            format!("at most {} key-value pairs allowed", MAX_METADATA_PAIRS),
            example,
        ));
    }
    for (key, value) in map {
        if key.chars().count() > MAX_METADATA_KEY {
            return Err(ValidationError::invalid(
                format!("{}.{}", path, key),
                format!("keys must be at most {} characters", MAX_METADATA_KEY),
                example,
            ));
        }
        match value.as_str() {
            Some(s) if s.chars().count() <= MAX_METADATA_VALUE => {}
            Some(_) => {
                return Err(ValidationError::invalid(
                    format!("{}.{}", path, key),
                    format!("values must be at most {} characters", MAX_METADATA_VALUE),
                    example,
                ))
            }
            None => {
                return Err(ValidationError::invalid(
                    format!("{}.{}", path, key),
                    "values must be strings",
                    example,
                ))
            }
        }
    }
    Ok(())
}

fn valid_function_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Tool configuration array (`code_interpreter`, `file_search`, `function`)
pub fn optional_tools(args: &Value, field: &str) -> Check {
    let example = example_for(field, r#"[{"type": "code_interpreter"}]"#);
    let tools = match present(args, field) {
        None => return Ok(()),
        Some(Value::Array(tools)) => tools,
        Some(value) => {
            return Err(ValidationError::invalid(
                field,
                format!("expected an array, got {}", type_name(value)),
                example,
            ))
        }
    };

    if tools.len() > 128 {
        return Err(ValidationError::invalid(field, "at most 128 tools allowed", example));
    }

    for (i, tool) in tools.iter().enumerate() {
        let path = format!("{}[{}]", field, i);
        if !tool.is_object() {
            return Err(ValidationError::invalid(&path, "each tool must be an object", example));
        }
        let tool_type = present(tool, "type")
            .ok_or_else(|| ValidationError::missing(format!("{}.type", path), example.clone()))?;
        check_enum(tool_type, &format!("{}.type", path), TOOL_TYPES)?;

        if tool_type.as_str() == Some("function") {
            let function_example = example_for(
                &format!("{}.function", path),
                r#"{"name": "get_weather", "parameters": {"type": "object"}}"#,
            );
            let function = present(tool, "function").ok_or_else(|| {
                ValidationError::missing(format!("{}.function", path), function_example.clone())
            })?;
            let name = function.get("name").and_then(Value::as_str).ok_or_else(|| {
                ValidationError::missing(format!("{}.function.name", path), function_example.clone())
            })?;
            if !valid_function_name(name) {
                return Err(ValidationError::invalid(
                    format!("{}.function.name", path),
                    "must be 1-64 characters of a-z, A-Z, 0-9, '_' or '-'",
                    function_example,
                ));
            }
            optional_object(function, "parameters", r#"{"type": "object", "properties": {}}"#)?;
        }
    }
    Ok(())
}

/// Message content: non-empty text or a non-empty array of typed parts
pub fn check_message_content(value: Option<&Value>, field: &str) -> Check {
    let example = example_for(field, r#""What is the weather today?""#);
    match value.filter(|v| !v.is_null()) {
        None => Err(ValidationError::missing(field, example)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(()),
        Some(Value::String(_)) => Err(ValidationError::invalid(field, "must not be empty", example)),
        Some(Value::Array(parts)) if !parts.is_empty() => {
            for (i, part) in parts.iter().enumerate() {
                if part.get("type").and_then(Value::as_str).is_none() {
                    return Err(ValidationError::invalid(
                        format!("{}[{}].type", field, i),
                        "each content part needs a string 'type'",
                        example_for(field, r#"[{"type": "text", "text": "Hello"}]"#),
                    ));
                }
            }
            Ok(())
        }
        Some(Value::Array(_)) => Err(ValidationError::invalid(field, "must not be empty", example)),
        Some(other) => Err(ValidationError::invalid(
            field,
            format!("expected a string or array, got {}", type_name(other)),
            example,
        )),
    }
}

/// One message object as used by thread creation and run additional messages
pub fn check_message_entry(entry: &Value, path: &str) -> Check {
    if !entry.is_object() {
        return Err(ValidationError::invalid(
            path,
            "each message must be an object",
            example_for(path, r#"{"role": "user", "content": "Hello"}"#),
        ));
    }
    let role_field = format!("{}.role", path);
    let role = present(entry, "role")
        .ok_or_else(|| ValidationError::missing(&role_field, example_for(&role_field, "\"user\"")))?;
    check_enum(role, &role_field, MESSAGE_ROLES)?;
    check_message_content(entry.get("content"), &format!("{}.content", path))?;
    optional_array_of_objects(entry, "attachments", &format!("{}.attachments", path))?;
    nested_metadata(entry, "metadata", &format!("{}.metadata", path))
}

pub fn optional_messages(args: &Value, field: &str) -> Check {
    match present(args, field) {
        None => Ok(()),
        Some(Value::Array(messages)) => messages
            .iter()
            .enumerate()
            .try_for_each(|(i, m)| check_message_entry(m, &format!("{}[{}]", field, i))),
        Some(value) => Err(ValidationError::invalid(
            field,
            format!("expected an array, got {}", type_name(value)),
            example_for(field, r#"[{"role": "user", "content": "Hello"}]"#),
        )),
    }
}

pub fn optional_array_of_objects(args: &Value, field: &str, path: &str) -> Check {
    let example = example_for(path, r#"[{"file_id": "file-abc123", "tools": [{"type": "file_search"}]}]"#);
    match present(args, field) {
        None => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_object) => Ok(()),
        Some(_) => Err(ValidationError::invalid(path, "expected an array of objects", example)),
    }
}

/// `limit`, `order`, and the `after`/`before` cursors of list tools
pub fn validate_list_params(args: &Value, cursor_kind: IdKind) -> Check {
    optional_integer_range(args, "limit", 1, 100, "20")?;
    optional_enum(args, "order", SORT_ORDERS)?;
    optional_id(args, "after", cursor_kind)?;
    optional_id(args, "before", cursor_kind)
}

/// Tool-output submission entries: each needs a call id and a string output
pub fn validate_tool_outputs(args: &Value, field: &str) -> Check {
    let example = example_for(field, r#"[{"tool_call_id": "call_abc123", "output": "72F and sunny"}]"#);
    let outputs = match present(args, field) {
        None => return Err(ValidationError::missing(field, example)),
        Some(Value::Array(outputs)) if !outputs.is_empty() => outputs,
        Some(Value::Array(_)) => {
            return Err(ValidationError::invalid(field, "must contain at least one entry", example))
        }
        Some(value) => {
            return Err(ValidationError::invalid(
                field,
                format!("expected an array, got {}", type_name(value)),
                example,
            ))
        }
    };

    for (i, entry) in outputs.iter().enumerate() {
        let path = format!("{}[{}]", field, i);
        if !entry.is_object() {
            return Err(ValidationError::invalid(&path, "each entry must be an object", example));
        }

        let call_field = format!("{}.tool_call_id", path);
        let call_id = present(entry, "tool_call_id")
            .ok_or_else(|| ValidationError::missing(&call_field, example.clone()))?;
        let call_id = check_non_empty_string(call_id, &call_field, IdKind::ToolCall.example())?;
        check_id(call_id, &call_field, IdKind::ToolCall)?;

        let output_field = format!("{}.output", path);
        match present(entry, "output") {
            None => return Err(ValidationError::missing(&output_field, example)),
            Some(Value::String(_)) => {}
            Some(value) => {
                return Err(ValidationError::invalid(
                    &output_field,
                    format!("expected a string, got {}", type_name(value)),
                    example,
                ))
            }
        }
    }
    Ok(())
}
