//! Flattening of normalized message bodies into display strings.
//!
//! Every renderer shows a message as one flat string: text parts pass
//! through, tool activity collapses to short bracketed markers, and
//! `apply_patch` invocations get a compact file summary.

use serde_json::Value;

use crate::models::{ContentPart, MessageBody};

/// Marker rendered for tool results (stdout is never shown inline).
pub const TOOL_RESULT_MARKER: &str = "[Tool Result]";

/// Marker rendered for thinking blocks.
pub const THINKING_MARKER: &str = "[Thinking...]";

/// Maximum characters of a tool prompt surfaced in its description.
const PROMPT_PREVIEW_CHARS: usize = 100;

/// Maximum file paths listed in an `apply_patch` summary.
const PATCH_LISTED_FILES: usize = 3;

/// Flatten a message body into a single display string.
///
/// String bodies pass through unchanged. Part sequences render one line per
/// part in encounter order, joined with newlines; empty renditions and
/// unknown part types are skipped. `None` yields the empty string.
pub fn extract_text(body: Option<&MessageBody>) -> String {
    match body {
        None => String::new(),
        Some(MessageBody::Text(s)) => s.clone(),
        Some(MessageBody::Parts(parts)) => {
            let rendered: Vec<String> =
                parts.iter().filter_map(render_part).filter(|s| !s.is_empty()).collect();
            rendered.join("\n")
        }
    }
}

fn render_part(part: &ContentPart) -> Option<String> {
    match part {
        ContentPart::Text { text }
        | ContentPart::InputText { text }
        | ContentPart::OutputText { text } => Some(text.clone()),
        ContentPart::ToolUse { name, input, .. } => {
            let description = tool_use_description(input);
            Some(format!("[Tool: {name}] {description}").trim_end().to_string())
        }
        ContentPart::ToolResult { .. } => Some(TOOL_RESULT_MARKER.to_string()),
        ContentPart::Thinking { .. } => Some(THINKING_MARKER.to_string()),
    }
}

/// Pick the most informative one-line description of a tool invocation.
///
/// Priority: `input.command` (string, or array - with a special case for
/// `apply_patch`), then `input.description`, then a truncated
/// `input.prompt`, then the empty string.
fn tool_use_description(input: &Value) -> String {
    if let Some(command) = input.get("command") {
        if let Some(s) = command.as_str() {
            return s.to_string();
        }
        if let Some(parts) = command.as_array() {
            if parts.first().and_then(Value::as_str) == Some("apply_patch")
                && let Some(patch) = parts.get(1).and_then(Value::as_str)
            {
                return summarize_apply_patch(patch);
            }
            if !parts.is_empty() && parts.iter().all(Value::is_string) {
                let joined: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
                return joined.join(" ");
            }
        }
    }

    if let Some(description) = input.get("description").and_then(Value::as_str) {
        return description.to_string();
    }

    if let Some(prompt) = input.get("prompt").and_then(Value::as_str) {
        if prompt.chars().count() > PROMPT_PREVIEW_CHARS {
            let preview: String = prompt.chars().take(PROMPT_PREVIEW_CHARS).collect();
            return format!("{preview}...");
        }
        return prompt.to_string();
    }

    String::new()
}

/// Summarize an `apply_patch` document as
/// `apply_patch: [a, b, c, +N more] +<adds> ~<updates> -<deletes>`,
/// counting the `*** Add/Update/Delete File:` markers and listing the first
/// few touched paths in encounter order.
fn summarize_apply_patch(patch: &str) -> String {
    let mut adds = 0usize;
    let mut updates = 0usize;
    let mut deletes = 0usize;
    let mut files: Vec<&str> = Vec::new();

    for line in patch.lines() {
        let line = line.trim();
        let path = if let Some(rest) = line.strip_prefix("*** Add File:") {
            adds += 1;
            rest
        } else if let Some(rest) = line.strip_prefix("*** Update File:") {
            updates += 1;
            rest
        } else if let Some(rest) = line.strip_prefix("*** Delete File:") {
            deletes += 1;
            rest
        } else {
            continue;
        };
        let path = path.trim();
        if !path.is_empty() {
            files.push(path);
        }
    }

    let mut listed: Vec<String> =
        files.iter().take(PATCH_LISTED_FILES).map(|f| f.to_string()).collect();
    if files.len() > PATCH_LISTED_FILES {
        listed.push(format!("+{} more", files.len() - PATCH_LISTED_FILES));
    }

    format!("apply_patch: [{}] +{adds} ~{updates} -{deletes}", listed.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tool_use(input: Value) -> ContentPart {
        ContentPart::ToolUse { name: "shell".to_string(), input, id: None }
    }

    #[test]
    fn test_extract_none_is_empty() {
        assert_eq!(extract_text(None), "");
    }

    #[test]
    fn test_extract_string_passthrough() {
        let body = MessageBody::Text("plain".to_string());
        assert_eq!(extract_text(Some(&body)), "plain");
    }

    #[test]
    fn test_extract_joins_text_parts_with_newline() {
        let body = MessageBody::Parts(vec![
            ContentPart::InputText { text: "first".to_string() },
            ContentPart::OutputText { text: "second".to_string() },
            ContentPart::Text { text: "third".to_string() },
        ]);
        assert_eq!(extract_text(Some(&body)), "first\nsecond\nthird");
    }

    #[test]
    fn test_extract_skips_empty_parts() {
        let body = MessageBody::Parts(vec![
            ContentPart::Text { text: String::new() },
            ContentPart::Text { text: "kept".to_string() },
        ]);
        assert_eq!(extract_text(Some(&body)), "kept");
    }

    #[test]
    fn test_extract_markers() {
        let body = MessageBody::Parts(vec![
            ContentPart::ToolResult { output: Some("ignored stdout".to_string()) },
            ContentPart::Thinking { thinking: "hmm".to_string() },
        ]);
        assert_eq!(extract_text(Some(&body)), "[Tool Result]\n[Thinking...]");
    }

    #[test]
    fn test_tool_use_string_command() {
        let body = MessageBody::Parts(vec![tool_use(json!({"command": "ls -la"}))]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell] ls -la");
    }

    #[test]
    fn test_tool_use_array_command_joined() {
        let body = MessageBody::Parts(vec![tool_use(json!({"command": ["git", "status"]}))]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell] git status");
    }

    #[test]
    fn test_tool_use_apply_patch_summary() {
        let patch = "*** Add File: a\n*** Update File: b\n";
        let body =
            MessageBody::Parts(vec![tool_use(json!({"command": ["apply_patch", patch]}))]);
        assert_eq!(
            extract_text(Some(&body)),
            "[Tool: shell] apply_patch: [a, b] +1 ~1 -0"
        );
    }

    #[test]
    fn test_tool_use_apply_patch_lists_at_most_three_files() {
        let patch = "*** Add File: a\n*** Add File: b\n*** Update File: c\n*** Delete File: d\n";
        let body =
            MessageBody::Parts(vec![tool_use(json!({"command": ["apply_patch", patch]}))]);
        assert_eq!(
            extract_text(Some(&body)),
            "[Tool: shell] apply_patch: [a, b, c, +1 more] +2 ~1 -1"
        );
    }

    #[test]
    fn test_tool_use_description_fallback() {
        let body = MessageBody::Parts(vec![tool_use(json!({"description": "searching files"}))]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell] searching files");
    }

    #[test]
    fn test_tool_use_prompt_truncated() {
        let prompt = "p".repeat(150);
        let body = MessageBody::Parts(vec![tool_use(json!({"prompt": prompt}))]);
        let expected = format!("[Tool: shell] {}...", "p".repeat(100));
        assert_eq!(extract_text(Some(&body)), expected);
    }

    #[test]
    fn test_tool_use_short_prompt_not_truncated() {
        let body = MessageBody::Parts(vec![tool_use(json!({"prompt": "short"}))]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell] short");
    }

    #[test]
    fn test_tool_use_no_description_fields() {
        let body = MessageBody::Parts(vec![tool_use(json!({}))]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell]");
    }

    #[test]
    fn test_tool_use_command_array_with_non_strings_falls_through() {
        let body = MessageBody::Parts(vec![tool_use(
            json!({"command": ["ls", 42], "description": "list"}),
        )]);
        assert_eq!(extract_text(Some(&body)), "[Tool: shell] list");
    }
}
