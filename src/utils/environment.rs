use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Get the Codex data directory (~/.codex), honoring a `CODEX_HOME` override.
pub fn codex_home() -> Result<PathBuf> {
    if let Ok(custom) = env::var("CODEX_HOME")
        && !custom.is_empty()
    {
        return Ok(PathBuf::from(custom));
    }
    dirs::home_dir().map(|home| home.join(".codex")).context("could not determine home directory")
}

/// Root of the session log tree (`<home>/sessions/<YYYY>/<MM>/<DD>/*.jsonl`).
pub fn sessions_dir(codex_home: &Path) -> PathBuf {
    codex_home.join("sessions")
}

/// Consolidated history artifact written by rollout-format installations.
pub fn history_file(codex_home: &Path) -> PathBuf {
    codex_home.join("history.jsonl")
}
