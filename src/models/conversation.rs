use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Who produced a message. Session logs carry other roles (`developer`,
/// `system`, tool plumbing), but only these two survive normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::Assistant => "assistant",
        }
    }
}

/// One typed fragment of a message body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    InputText { text: String },
    OutputText { text: String },
    ToolUse {
        name: String,
        input: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    ToolResult {
        /// Captured stdout for legacy logs; `None` means only a generic
        /// completion marker is known (rollout logs never surface stdout).
        #[serde(skip_serializing_if = "Option::is_none")]
        output: Option<String>,
    },
    Thinking { thinking: String },
}

/// A message body is either a bare string (older logs) or a sequence of
/// typed content parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageBody {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageBody {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageBody::Text(s) => s.is_empty(),
            MessageBody::Parts(parts) => parts.is_empty(),
        }
    }
}

/// A single normalized message within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub session_id: String,
    /// Real per-record timestamp when the log carried one, otherwise
    /// synthesized from the session start plus a monotonic counter.
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub body: MessageBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_use_result: Option<String>,
}

/// A fully parsed session. A conversation with zero messages is never
/// constructed; parsers return `None` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub session_id: String,
    pub source_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_path: Option<PathBuf>,
    /// `owner/repo` derived from the repository URL, or `"unknown"`.
    pub project_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    /// Insertion order is chronological; timestamps are strictly monotonic.
    pub messages: Vec<Message>,
    pub first_message: String,
    pub last_message: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Conversation {
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}
