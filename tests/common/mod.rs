//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Builder for creating fake Codex home directories with a
/// `sessions/YYYY/MM/DD/*.jsonl` tree.
pub struct CodexHomeBuilder {
    temp_dir: TempDir,
}

impl CodexHomeBuilder {
    /// Create a new builder with an empty Codex home
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the Codex home directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Get the path to the sessions root
    pub fn sessions_root(&self) -> PathBuf {
        self.temp_dir.path().join("sessions")
    }

    /// Add the consolidated history artifact (implies rollout format)
    pub fn with_history_artifact(self) -> Self {
        fs::write(self.temp_dir.path().join("history.jsonl"), "")
            .expect("Failed to create history.jsonl");
        self
    }

    /// Add a session file with raw content under `sessions/<y>/<m>/<d>/`
    pub fn with_session_file(self, date: (&str, &str, &str), name: &str, content: &str) -> Self {
        let day_dir = self.sessions_root().join(date.0).join(date.1).join(date.2);
        fs::create_dir_all(&day_dir).expect("Failed to create day dir");
        fs::write(day_dir.join(name), content).expect("Failed to write session file");
        self
    }

    /// Add a rollout-format session built from a builder
    pub fn with_rollout_session(
        self,
        date: (&str, &str, &str),
        name: &str,
        session: &RolloutSessionBuilder,
    ) -> Self {
        self.with_session_file(date, name, &session.to_jsonl())
    }

    /// Add a legacy-format session built from a builder
    pub fn with_legacy_session(
        self,
        date: (&str, &str, &str),
        name: &str,
        session: &LegacySessionBuilder,
    ) -> Self {
        self.with_session_file(date, name, &session.to_jsonl())
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for CodexHomeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for rollout-format session files
pub struct RolloutSessionBuilder {
    session_id: String,
    start: String,
    cwd: String,
    lines: Vec<String>,
}

impl RolloutSessionBuilder {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            start: "2026-01-01T00:00:00Z".to_string(),
            cwd: "/home/test/project".to_string(),
            lines: Vec::new(),
        }
    }

    pub fn start(mut self, start: &str) -> Self {
        self.start = start.to_string();
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = cwd.to_string();
        self
    }

    pub fn user(mut self, text: &str) -> Self {
        self.lines.push(format!(
            r#"{{"type":"response_item","payload":{{"type":"message","role":"user","content":[{{"type":"input_text","text":"{text}"}}]}}}}"#
        ));
        self
    }

    pub fn assistant(mut self, text: &str) -> Self {
        self.lines.push(format!(
            r#"{{"type":"response_item","payload":{{"type":"message","role":"assistant","content":[{{"type":"output_text","text":"{text}"}}]}}}}"#
        ));
        self
    }

    pub fn event(mut self) -> Self {
        self.lines.push(
            r#"{"type":"event_msg","payload":{"type":"token_count","info":{}}}"#.to_string(),
        );
        self
    }

    pub fn raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        let meta = format!(
            r#"{{"type":"session_meta","payload":{{"id":"{}","timestamp":"{}","cwd":"{}"}}}}"#,
            self.session_id, self.start, self.cwd
        );
        let mut lines = vec![meta];
        lines.extend(self.lines.iter().cloned());
        lines.join("\n")
    }
}

/// Builder for legacy-format session files
pub struct LegacySessionBuilder {
    session_id: String,
    start_ms: i64,
    repo_url: Option<String>,
    branch: Option<String>,
    lines: Vec<String>,
}

impl LegacySessionBuilder {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            start_ms: 1_760_000_000_000,
            repo_url: None,
            branch: None,
            lines: Vec::new(),
        }
    }

    pub fn start_ms(mut self, start_ms: i64) -> Self {
        self.start_ms = start_ms;
        self
    }

    pub fn git(mut self, repo_url: &str, branch: &str) -> Self {
        self.repo_url = Some(repo_url.to_string());
        self.branch = Some(branch.to_string());
        self
    }

    pub fn user(mut self, text: &str) -> Self {
        self.lines.push(format!(
            r#"{{"type":"message","role":"user","content":[{{"type":"input_text","text":"{text}"}}]}}"#
        ));
        self
    }

    pub fn assistant(mut self, text: &str) -> Self {
        self.lines.push(format!(
            r#"{{"type":"message","role":"assistant","content":[{{"type":"output_text","text":"{text}"}}]}}"#
        ));
        self
    }

    pub fn environment_context(mut self, cwd: &str) -> Self {
        self.lines.push(format!(
            r#"{{"type":"message","role":"user","content":[{{"type":"input_text","text":"<environment_context><cwd>{cwd}</cwd></environment_context>"}}]}}"#
        ));
        self
    }

    pub fn raw_line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        let git_field = match (&self.repo_url, &self.branch) {
            (Some(url), Some(branch)) => {
                format!(r#","git":{{"repository_url":"{url}","branch":"{branch}"}}"#)
            }
            _ => String::new(),
        };
        let meta = format!(
            r#"{{"id":"{}","timestamp":{}{}}}"#,
            self.session_id, self.start_ms, git_field
        );
        let mut lines = vec![meta];
        lines.extend(self.lines.iter().cloned());
        lines.join("\n")
    }
}
