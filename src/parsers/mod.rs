//! Schema-specific session file parsers.
//!
//! [`parse_legacy_file`] handles logs written before the 0.32.0 release;
//! [`parse_rollout_file`] handles the `session_meta`-headed format written
//! since. Both produce the same normalized [`Conversation`] model, return
//! `Ok(None)` for files that yield no messages, and skip malformed lines
//! without aborting the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::{Conversation, Message, MessageBody};
use crate::text::extract_text;

pub mod deserializers;
pub mod legacy;
pub mod rollout;

pub use legacy::parse_legacy_file;
pub use rollout::parse_rollout_file;

/// User messages carrying this tag are framework boilerplate, not turns.
pub(crate) const ENVIRONMENT_CONTEXT_TAG: &str = "<environment_context>";

/// Display name used when no repository URL is available.
pub(crate) const UNKNOWN_PROJECT: &str = "unknown";

/// Session metadata gathered from a file's header before its records are
/// walked. Both parsers fill one of these, then hand it to [`finish`].
pub(crate) struct SessionHead {
    pub session_id: String,
    pub source_path: PathBuf,
    pub start_time: DateTime<Utc>,
    pub project_path: Option<PathBuf>,
    pub repo_url: Option<String>,
    pub git_branch: Option<String>,
}

/// Assemble the final conversation, or `None` when no messages survived.
pub(crate) fn finish(head: SessionHead, mut messages: Vec<Message>) -> Option<Conversation> {
    if messages.is_empty() {
        return None;
    }

    for message in &mut messages {
        if message.cwd.is_none() {
            message.cwd = head.project_path.clone();
        }
    }

    let project_name = head
        .repo_url
        .as_deref()
        .and_then(project_name_from_repo_url)
        .unwrap_or_else(|| UNKNOWN_PROJECT.to_string());

    let first_message = extract_text(messages.first().map(|m| &m.body));
    let last_message = extract_text(messages.last().map(|m| &m.body));
    let end_time = messages
        .last()
        .map(|m| m.timestamp)
        .filter(|ts| *ts >= head.start_time)
        .unwrap_or(head.start_time);

    Some(Conversation {
        session_id: head.session_id,
        source_path: head.source_path,
        project_path: head.project_path,
        project_name,
        git_branch: head.git_branch,
        messages,
        first_message,
        last_message,
        start_time: head.start_time,
        end_time,
    })
}

/// `owner/repo` from a repository URL: strip a trailing `.git`, take the
/// last two path segments.
pub(crate) fn project_name_from_repo_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(format!("{}/{}", segments[segments.len() - 2], segments[segments.len() - 1]))
}

/// Session ID recovered from a file name. Rollout files end in the session
/// UUID (`rollout-<ts>-<uuid>.jsonl`); otherwise the whole stem is used.
pub(crate) fn session_id_from_path(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("unknown");
    uuid_suffix(stem).unwrap_or_else(|| stem.to_string())
}

fn uuid_suffix(stem: &str) -> Option<String> {
    const UUID_LEN: usize = 36;
    let tail = stem.get(stem.len().checked_sub(UUID_LEN)?..)?;
    Uuid::parse_str(tail).ok().map(|uuid| uuid.to_string())
}

/// Git metadata (`{"git": {"repository_url": ..., "branch": ...}}`) from a
/// header object.
pub(crate) fn git_identity(meta: &Value) -> (Option<String>, Option<String>) {
    let Some(git) = meta.get("git") else {
        return (None, None);
    };
    let url = git.get("repository_url").and_then(Value::as_str).map(str::to_string);
    let branch = git.get("branch").and_then(Value::as_str).map(str::to_string);
    (url, branch)
}

/// The synthesized timestamp for ordinal `counter`: session start plus that
/// many milliseconds, keeping same-second bursts strictly ordered.
pub(crate) fn synthesized_timestamp(start: DateTime<Utc>, counter: i64) -> DateTime<Utc> {
    start + Duration::milliseconds(counter)
}

/// Flattened plain text of a raw content value, for marker scans.
pub(crate) fn raw_content_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let mut out = String::new();
            for item in items {
                if let Some(text) = item.get("text").and_then(Value::as_str) {
                    out.push_str(text);
                    out.push('\n');
                }
            }
            out
        }
        _ => String::new(),
    }
}

/// Extract the payload of a `<cwd>...</cwd>` marker.
pub(crate) fn cwd_marker(text: &str) -> Option<PathBuf> {
    let start = text.find("<cwd>")? + "<cwd>".len();
    let end = text[start..].find("</cwd>")? + start;
    let cwd = text[start..end].trim();
    if cwd.is_empty() { None } else { Some(PathBuf::from(cwd)) }
}

/// True when a body (string or parts) is worth keeping as a message.
pub(crate) fn body_has_content(body: &MessageBody) -> bool {
    !body.is_empty()
}
