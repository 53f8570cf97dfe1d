//! Codex Session Browser - Browse Codex CLI sessions from on-disk logs
//!
//! This library reads the session logs the Codex CLI keeps under
//! `~/.codex/sessions/<YYYY>/<MM>/<DD>/*.jsonl` and normalizes them into one
//! conversation model, regardless of which of the two incompatible on-disk
//! schemas the installed CLI writes. It supports:
//!
//! - Detecting the active schema (legacy vs. rollout) by CLI version, with a
//!   local-log heuristic fallback
//! - Parsing either schema into normalized [`Conversation`] records
//! - Paginated, sorted, path-filtered session listings
//! - Display-width-aware string measurement and truncation for terminal
//!   rendering (CJK, emoji, surrogate pairs)
//!
//! # Example
//!
//! ```no_run
//! use codex_session_browser::{CliContext, ConversationRepository, codex_home};
//!
//! let home = codex_home()?;
//! let ctx = CliContext::detect();
//! let repository = ConversationRepository::discover(&ctx, &home);
//! let page = repository.get_page(20, 0, None)?;
//! println!("Showing {} of {} sessions", page.conversations.len(), page.total);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod detect;
pub mod models;
pub mod parsers;
pub mod probe;
pub mod repository;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use detect::{SessionFormat, is_rollout_file, probe_local_logs, resolve_format};
pub use models::{ContentPart, Conversation, Message, MessageBody, MessageKind};
pub use parsers::{parse_legacy_file, parse_rollout_file};
pub use probe::{Capabilities, CliContext, compare_semver, get_version};
pub use repository::{ConversationPage, ConversationRepository};
pub use text::{
    extract_text, char_width, string_width, truncate_to_width, truncate_to_width_strict,
};
pub use utils::codex_home;
