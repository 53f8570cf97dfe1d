//! Parser for the rollout (0.32.0+) session log schema.
//!
//! Line 1 must be a `session_meta` record carrying explicit session
//! metadata (id, cwd, git); every following line is a `response_item`
//! (payload-driven) or `event_msg` (dropped) envelope, each optionally
//! stamped with a real timestamp.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::models::{ContentPart, Conversation, Message, MessageBody, MessageKind};
use crate::parsers::deserializers::{file_mtime, lenient_json, timestamp_from_value};
use crate::parsers::{
    ENVIRONMENT_CONTEXT_TAG, SessionHead, body_has_content, finish, git_identity,
    raw_content_text, session_id_from_path, synthesized_timestamp,
};

/// Parse a rollout session file.
///
/// Returns `Ok(None)` when the first line is not a `session_meta` record
/// (the one fatal precondition of this schema) or when no message survives
/// filtering; individual malformed records are skipped.
///
/// # Errors
///
/// Returns an error only when the file itself cannot be opened.
pub fn parse_rollout_file(path: &Path) -> Result<Option<Conversation>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    let meta_line = loop {
        match lines.next() {
            Some(Ok(line)) if line.trim().is_empty() => continue,
            Some(Ok(line)) => break line,
            Some(Err(_)) | None => return Ok(None),
        }
    };

    // Defensive re-check of the discriminator; the repository's fast path
    // already classified this file, but the parser stands alone too.
    let Some(meta) = lenient_json(&meta_line) else {
        return Ok(None);
    };
    if meta.get("type").and_then(Value::as_str) != Some("session_meta") {
        return Ok(None);
    }
    let payload = meta.get("payload").cloned().unwrap_or_else(|| json!({}));

    let session_id = payload
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| session_id_from_path(path));
    let start_time = payload
        .get("timestamp")
        .and_then(timestamp_from_value)
        .or_else(|| meta.get("timestamp").and_then(timestamp_from_value))
        .unwrap_or_else(|| file_mtime(path));
    let project_path = payload.get("cwd").and_then(Value::as_str).map(PathBuf::from);
    let (repo_url, git_branch) = git_identity(&payload);

    let head = SessionHead {
        session_id: session_id.clone(),
        source_path: path.to_path_buf(),
        start_time,
        project_path,
        repo_url,
        git_branch,
    };

    let mut messages: Vec<Message> = Vec::new();
    let mut counter: i64 = 0;

    for line in lines {
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let Some(value) = lenient_json(&line) else {
            continue;
        };

        let record_timestamp = value.get("timestamp").and_then(timestamp_from_value);
        match value.get("type").and_then(Value::as_str) {
            // Event messages never carry conversation content, but they
            // occupy an ordering slot.
            Some("event_msg") => {
                counter += 1;
            }
            Some("response_item") => {
                let payload = value.get("payload").cloned().unwrap_or(Value::Null);
                if let Some(advance) = append_response_item(
                    &payload,
                    &session_id,
                    start_time,
                    counter,
                    record_timestamp,
                    &mut messages,
                ) {
                    counter += advance;
                }
            }
            _ => continue,
        }
    }

    Ok(finish(head, messages))
}

/// Handle one `response_item` payload. Returns `Some(1)` when the record
/// occupies an ordering slot (kept, or dropped boilerplate), `None` when it
/// is skipped entirely.
fn append_response_item(
    payload: &Value,
    session_id: &str,
    start_time: DateTime<Utc>,
    counter: i64,
    record_timestamp: Option<DateTime<Utc>>,
    messages: &mut Vec<Message>,
) -> Option<i64> {
    let payload_type = payload.get("type").and_then(Value::as_str)?.to_ascii_lowercase();
    let timestamp =
        record_timestamp.unwrap_or_else(|| synthesized_timestamp(start_time, counter));

    let push = |messages: &mut Vec<Message>, kind: MessageKind, body: MessageBody| {
        messages.push(Message {
            session_id: session_id.to_string(),
            timestamp,
            kind,
            body,
            cwd: None,
            tool_use_result: None,
        });
    };

    match payload_type.as_str() {
        "message" => {
            let kind = match payload.get("role").and_then(Value::as_str) {
                Some("user") => MessageKind::User,
                Some("assistant") => MessageKind::Assistant,
                _ => return None,
            };
            let content = payload.get("content").cloned().unwrap_or(Value::Null);
            if kind == MessageKind::User
                && raw_content_text(&content).contains(ENVIRONMENT_CONTEXT_TAG)
            {
                return Some(1);
            }
            let body = message_body(&content);
            if !body_has_content(&body) {
                return None;
            }
            push(messages, kind, body);
            Some(1)
        }
        "reasoning" => None,
        "function_call" | "custom_tool_call" => {
            let name = payload.get("name").and_then(Value::as_str)?;
            let name = if payload_type == "custom_tool_call" {
                format!("custom:{name}")
            } else {
                name.to_string()
            };
            let input = tool_input(payload);
            let id = payload
                .get("call_id")
                .or_else(|| payload.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string);
            push(
                messages,
                MessageKind::Assistant,
                MessageBody::Parts(vec![ContentPart::ToolUse { name, input, id }]),
            );
            Some(1)
        }
        // Rollout logs never surface stdout; only completion is recorded.
        "function_call_output" | "custom_tool_call_output" => {
            push(
                messages,
                MessageKind::Assistant,
                MessageBody::Parts(vec![ContentPart::ToolResult { output: None }]),
            );
            Some(1)
        }
        "local_shell_call" => {
            let command = payload
                .get("action")
                .and_then(|action| action.get("command"))
                .cloned()
                .unwrap_or(Value::Null);
            push(
                messages,
                MessageKind::Assistant,
                MessageBody::Parts(vec![ContentPart::ToolUse {
                    name: "shell".to_string(),
                    input: json!({ "command": command }),
                    id: None,
                }]),
            );
            Some(1)
        }
        "web_search_call" => {
            let query = payload
                .get("action")
                .and_then(|action| action.get("query"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            push(
                messages,
                MessageKind::Assistant,
                MessageBody::Parts(vec![ContentPart::ToolUse {
                    name: "web_search".to_string(),
                    input: json!({ "query": query }),
                    id: None,
                }]),
            );
            Some(1)
        }
        _ => None,
    }
}

/// Tool arguments: `arguments` preferred over `input`, JSON strings decoded
/// leniently, object values used as-is.
fn tool_input(payload: &Value) -> Value {
    let raw = payload.get("arguments").or_else(|| payload.get("input"));
    match raw {
        Some(Value::String(s)) => lenient_json(s).unwrap_or(Value::Null),
        Some(other) => other.clone(),
        None => Value::Null,
    }
}

/// Rollout message bodies keep only their text-typed parts; every other
/// part type in the payload is discarded.
fn message_body(content: &Value) -> MessageBody {
    match content {
        Value::String(s) => MessageBody::Text(s.clone()),
        Value::Array(items) => {
            let parts: Vec<ContentPart> = items
                .iter()
                .filter_map(|item| {
                    let text = item.get("text").and_then(Value::as_str)?.to_string();
                    let part_type =
                        item.get("type").and_then(Value::as_str)?.to_ascii_lowercase();
                    match part_type.as_str() {
                        "input_text" => Some(ContentPart::InputText { text }),
                        "output_text" => Some(ContentPart::OutputText { text }),
                        "text" => Some(ContentPart::Text { text }),
                        _ => None,
                    }
                })
                .collect();
            MessageBody::Parts(parts)
        }
        _ => MessageBody::Parts(Vec::new()),
    }
}
