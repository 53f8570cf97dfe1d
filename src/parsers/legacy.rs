//! Parser for the legacy (pre-0.32.0) session log schema.
//!
//! Line 1 is a free-form metadata object; every following line is an
//! independent record tagged by `type`. The project path is not stored
//! explicitly - it is recovered from a `<cwd>...</cwd>` marker inside the
//! first user message that carries one.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::{ContentPart, Conversation, Message, MessageBody, MessageKind};
use crate::parsers::deserializers::{file_mtime, lenient_json, timestamp_from_value};
use crate::parsers::{
    ENVIRONMENT_CONTEXT_TAG, SessionHead, body_has_content, cwd_marker, finish, git_identity,
    raw_content_text, session_id_from_path, synthesized_timestamp,
};

/// Parse a legacy session file.
///
/// Returns `Ok(None)` when the metadata line is unparsable or no message
/// survives filtering; individual malformed records are skipped without
/// aborting the file.
///
/// # Errors
///
/// Returns an error only when the file itself cannot be opened.
pub fn parse_legacy_file(path: &Path) -> Result<Option<Conversation>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open session file: {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();

    // Metadata line: first non-blank line of the file.
    let meta_line = loop {
        match lines.next() {
            Some(Ok(line)) if line.trim().is_empty() => continue,
            Some(Ok(line)) => break line,
            Some(Err(_)) | None => return Ok(None),
        }
    };

    let Some(meta) = lenient_json(&meta_line).filter(Value::is_object) else {
        return Ok(None);
    };

    let session_id = meta
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| session_id_from_path(path));
    let start_time = meta
        .get("timestamp")
        .and_then(timestamp_from_value)
        .unwrap_or_else(|| file_mtime(path));
    let (repo_url, git_branch) = git_identity(&meta);

    let mut head = SessionHead {
        session_id: session_id.clone(),
        source_path: path.to_path_buf(),
        start_time,
        project_path: None,
        repo_url,
        git_branch,
    };

    let mut messages: Vec<Message> = Vec::new();
    let mut counter: i64 = 0;

    for line in lines {
        // A read error mid-file leaves the earlier records intact.
        let Ok(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }
        let Some(value) = lenient_json(&line) else {
            continue;
        };
        if !value.is_object() {
            continue;
        }

        // State snapshots are bookkeeping, not conversation.
        if value.get("record_type").and_then(Value::as_str) == Some("state") {
            continue;
        }

        match value.get("type").and_then(Value::as_str) {
            Some("message") => {
                let Some(kind) = message_kind(&value) else {
                    continue;
                };
                let content = value.get("content").cloned().unwrap_or(Value::Null);
                let flat = raw_content_text(&content);

                // The cwd marker is scanned before the boilerplate drop:
                // it usually lives inside the environment context message.
                if kind == MessageKind::User && head.project_path.is_none() {
                    head.project_path = cwd_marker(&flat);
                }
                if kind == MessageKind::User && flat.contains(ENVIRONMENT_CONTEXT_TAG) {
                    counter += 1;
                    continue;
                }

                let body = message_body(&content);
                if !body_has_content(&body) {
                    continue;
                }
                messages.push(Message {
                    session_id: session_id.clone(),
                    timestamp: synthesized_timestamp(start_time, counter),
                    kind,
                    body,
                    cwd: None,
                    tool_use_result: None,
                });
                counter += 1;
            }
            Some("function_call") => {
                let Some(name) = value.get("name").and_then(Value::as_str) else {
                    continue;
                };
                let input = value
                    .get("arguments")
                    .and_then(Value::as_str)
                    .and_then(lenient_json)
                    .unwrap_or(Value::Null);
                let id = value
                    .get("call_id")
                    .or_else(|| value.get("id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);

                messages.push(Message {
                    session_id: session_id.clone(),
                    timestamp: synthesized_timestamp(start_time, counter),
                    kind: MessageKind::Assistant,
                    body: MessageBody::Parts(vec![ContentPart::ToolUse {
                        name: name.to_string(),
                        input,
                        id,
                    }]),
                    cwd: None,
                    tool_use_result: None,
                });
                counter += 1;
            }
            Some("function_call_output") => {
                let stdout = call_output_stdout(&value);
                messages.push(Message {
                    session_id: session_id.clone(),
                    timestamp: synthesized_timestamp(start_time, counter),
                    kind: MessageKind::Assistant,
                    body: MessageBody::Parts(vec![ContentPart::ToolResult {
                        output: stdout.clone(),
                    }]),
                    cwd: None,
                    tool_use_result: stdout,
                });
                counter += 1;
            }
            // Reasoning traces carry no display content.
            Some("reasoning") => continue,
            _ => continue,
        }
    }

    Ok(finish(head, messages))
}

fn message_kind(value: &Value) -> Option<MessageKind> {
    match value.get("role").and_then(Value::as_str) {
        Some("user") => Some(MessageKind::User),
        Some("assistant") => Some(MessageKind::Assistant),
        _ => None,
    }
}

/// Normalize legacy message content: a bare string passes through, an item
/// array keeps its text-typed entries.
fn message_body(content: &Value) -> MessageBody {
    match content {
        Value::String(s) => MessageBody::Text(s.clone()),
        Value::Array(items) => {
            let parts: Vec<ContentPart> = items
                .iter()
                .filter_map(|item| {
                    let text = item.get("text").and_then(Value::as_str)?.to_string();
                    match item.get("type").and_then(Value::as_str) {
                        Some("input_text") => Some(ContentPart::InputText { text }),
                        Some("output_text") => Some(ContentPart::OutputText { text }),
                        Some("text") => Some(ContentPart::Text { text }),
                        _ => None,
                    }
                })
                .collect();
            MessageBody::Parts(parts)
        }
        _ => MessageBody::Parts(Vec::new()),
    }
}

/// Legacy tool outputs nest stdout as a JSON string: `output` is itself a
/// JSON document whose `output` field is the captured text. Anything not
/// decodable that way is reduced to a generic completion marker (`None`).
fn call_output_stdout(value: &Value) -> Option<String> {
    let raw = value.get("output").and_then(Value::as_str)?;
    let decoded = lenient_json(raw)?;
    decoded.get("output").and_then(Value::as_str).map(str::to_string)
}
