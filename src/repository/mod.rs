//! Filesystem-backed access to parsed conversations.
//!
//! # Error Handling Strategy
//!
//! Listing follows the graceful-degradation rules of a CLI tool reading
//! someone else's data directory:
//!
//! - **Missing root**: an empty result, not an error
//! - **Unreadable intermediate directories**: skipped, scan continues
//! - **Malformed or mismatched files**: contribute zero conversations,
//!   siblings are unaffected
//! - **Genuine filesystem errors at the root** (e.g. permission denied):
//!   the one condition propagated to the caller
//!
//! Every query re-reads the tree from scratch; nothing is cached.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::detect::{SessionFormat, is_rollout_file, resolve_format};
use crate::models::Conversation;
use crate::parsers::{parse_legacy_file, parse_rollout_file};
use crate::probe::CliContext;
use crate::utils::sessions_dir;

/// One page of a conversation listing plus the total count of the filtered
/// set, so callers can render pagination controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationPage {
    pub conversations: Vec<Conversation>,
    pub total: usize,
}

/// Reads session logs from a `<root>/<YYYY>/<MM>/<DD>/*.jsonl` tree with a
/// fixed, pre-resolved schema.
pub struct ConversationRepository {
    sessions_root: PathBuf,
    format: SessionFormat,
}

impl ConversationRepository {
    pub fn new(sessions_root: impl Into<PathBuf>, format: SessionFormat) -> Self {
        Self { sessions_root: sessions_root.into(), format }
    }

    /// Resolve the active format once for an installation and point the
    /// repository at its sessions tree.
    pub fn discover(ctx: &CliContext, codex_home: &Path) -> Self {
        let format = resolve_format(ctx, codex_home);
        Self::new(sessions_dir(codex_home), format)
    }

    pub fn format(&self) -> SessionFormat {
        self.format
    }

    pub fn sessions_root(&self) -> &Path {
        &self.sessions_root
    }

    /// All conversations in the tree, newest (by end time) first,
    /// optionally restricted to an exact project path.
    ///
    /// # Errors
    ///
    /// Returns an error only for a genuine filesystem failure at the root
    /// that is not "does not exist".
    pub fn get_all(&self, filter_cwd: Option<&Path>) -> Result<Vec<Conversation>> {
        let mut conversations = Vec::new();

        for file in self.collect_session_files()? {
            // Fast first-line check lets us skip files of the inactive
            // format without parsing them fully.
            let rollout = is_rollout_file(&file);
            let matches_format = match self.format {
                SessionFormat::Rollout => rollout,
                SessionFormat::Legacy => !rollout,
            };
            if !matches_format {
                continue;
            }

            let parsed = match self.format {
                SessionFormat::Rollout => parse_rollout_file(&file),
                SessionFormat::Legacy => parse_legacy_file(&file),
            };
            match parsed {
                Ok(Some(conversation)) => conversations.push(conversation),
                Ok(None) => {}
                Err(e) => {
                    eprintln!("Warning: skipping session file {}: {e:#}", file.display());
                }
            }
        }

        if let Some(cwd) = filter_cwd {
            conversations.retain(|c| c.project_path.as_deref() == Some(cwd));
        }
        conversations.sort_by(|a, b| b.end_time.cmp(&a.end_time));

        Ok(conversations)
    }

    /// The contiguous slice `[offset, offset + limit)` of the filtered,
    /// sorted listing, plus the exact total count of the filtered set.
    pub fn get_page(
        &self,
        limit: usize,
        offset: usize,
        filter_cwd: Option<&Path>,
    ) -> Result<ConversationPage> {
        let all = self.get_all(filter_cwd)?;
        let total = all.len();
        let conversations = all.into_iter().skip(offset).take(limit).collect();
        Ok(ConversationPage { conversations, total })
    }

    /// Candidate `.jsonl` files at `YYYY/MM/DD` depth, in path order.
    /// Unreadable subdirectories are skipped silently.
    fn collect_session_files(&self) -> Result<Vec<PathBuf>> {
        match fs::read_dir(&self.sessions_root) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).context(format!(
                    "Failed to read sessions directory: {}",
                    self.sessions_root.display()
                ));
            }
        }

        let mut files: Vec<PathBuf> = WalkDir::new(&self.sessions_root)
            .min_depth(4)
            .max_depth(4)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("jsonl"))
            .collect();
        files.sort();
        Ok(files)
    }
}
