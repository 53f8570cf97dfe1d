//! Detection of the on-disk session log schema.
//!
//! Codex switched its session log format at 0.32.0: earlier releases wrote
//! free-form metadata on line 1 ("legacy"), 0.32.0 and later write a
//! `session_meta` header record ("rollout"). The CLI version decides when
//! known; otherwise a heuristic look at the local logs breaks the tie,
//! defaulting to legacy because legacy parsing degrades more gracefully on
//! unexpected input.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::probe::{CliContext, compare_semver};
use crate::utils::{history_file, sessions_dir};

/// First CLI release that writes rollout-format logs.
pub const ROLLOUT_MIN_VERSION: &str = "0.32.0";

/// Discriminator carried by the first line of every rollout file.
const SESSION_META_TYPE: &str = "session_meta";

/// The two incompatible on-disk schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    Legacy,
    Rollout,
}

impl SessionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionFormat::Legacy => "legacy",
            SessionFormat::Rollout => "rollout",
        }
    }
}

/// What decided the active format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSource {
    CliVersion,
    LocalProbe,
}

/// Whether a CLI version writes rollout-format logs.
pub fn is_rollout_version(version: &str) -> bool {
    compare_semver(version, ROLLOUT_MIN_VERSION).is_ge()
}

/// Resolve the active format for an installation: by version when the probe
/// succeeded, by local-log heuristic otherwise.
pub fn resolve_format(ctx: &CliContext, codex_home: &Path) -> SessionFormat {
    resolve_format_detailed(ctx, codex_home).0
}

/// [`resolve_format`] plus which path made the decision.
pub fn resolve_format_detailed(ctx: &CliContext, codex_home: &Path) -> (SessionFormat, FormatSource) {
    match ctx.version.as_deref() {
        Some(version) if is_rollout_version(version) => {
            (SessionFormat::Rollout, FormatSource::CliVersion)
        }
        Some(_) => (SessionFormat::Legacy, FormatSource::CliVersion),
        None => (probe_local_logs(codex_home), FormatSource::LocalProbe),
    }
}

/// Heuristic fallback when the CLI version is unknown.
///
/// Preference order: the consolidated history artifact implies rollout;
/// otherwise the first line of the most recently written session file is
/// inspected. Every I/O or parse failure is swallowed, and the default on
/// an inconclusive probe is legacy.
pub fn probe_local_logs(codex_home: &Path) -> SessionFormat {
    if history_file(codex_home).is_file() {
        return SessionFormat::Rollout;
    }

    match latest_session_file(&sessions_dir(codex_home)) {
        Some(path) if is_rollout_file(&path) => SessionFormat::Rollout,
        _ => SessionFormat::Legacy,
    }
}

/// Fast single-file classification: parse only the first non-blank line and
/// test the `session_meta` discriminator. Lets a directory scan skip files
/// of the inactive format without fully parsing them.
pub fn is_rollout_file(path: &Path) -> bool {
    let Some(line) = first_nonblank_line(path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(&line) else {
        return false;
    };
    value.get("type").and_then(Value::as_str) == Some(SESSION_META_TYPE)
}

pub(crate) fn first_nonblank_line(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line.ok()?;
        if !line.trim().is_empty() {
            return Some(line);
        }
    }
    None
}

/// The most recently written `.jsonl` file under a `YYYY/MM/DD` tree:
/// scan year, month, and day directories in descending numeric order and
/// take the lexicographically-last file of the most recent non-empty day.
fn latest_session_file(sessions_root: &Path) -> Option<PathBuf> {
    for year in numeric_dirs_descending(sessions_root, 4) {
        for month in numeric_dirs_descending(&year, 2) {
            for day in numeric_dirs_descending(&month, 2) {
                let Ok(entries) = std::fs::read_dir(&day) else {
                    continue;
                };
                let mut files: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.is_file()
                            && path.extension().and_then(|ext| ext.to_str()) == Some("jsonl")
                    })
                    .collect();
                if files.is_empty() {
                    continue;
                }
                files.sort();
                return files.pop();
            }
        }
    }
    None
}

/// Subdirectories whose names are exactly `digits` ASCII digits, most
/// recent first. Unreadable directories yield an empty list.
fn numeric_dirs_descending(dir: &Path, digits: usize) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut dirs: Vec<(u32, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|ft| ft.is_dir()))
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.len() != digits || !name.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            name.parse::<u32>().ok().map(|n| (n, entry.path()))
        })
        .collect();
    dirs.sort_by(|a, b| b.0.cmp(&a.0));
    dirs.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn write_session(root: &Path, date: (&str, &str, &str), name: &str, content: &str) {
        let day_dir = root.join("sessions").join(date.0).join(date.1).join(date.2);
        fs::create_dir_all(&day_dir).expect("Failed to create day dir");
        let mut file = fs::File::create(day_dir.join(name)).expect("Failed to create session file");
        file.write_all(content.as_bytes()).expect("Failed to write session file");
    }

    const ROLLOUT_META: &str =
        r#"{"type":"session_meta","payload":{"id":"abc","cwd":"/tmp/project"}}"#;
    const LEGACY_META: &str = r#"{"id":"abc","timestamp":1234567890000}"#;

    #[test]
    fn test_version_threshold() {
        assert!(!is_rollout_version("0.31.9"));
        assert!(is_rollout_version("0.32.0"));
        assert!(is_rollout_version("0.32.0-beta"));
        assert!(is_rollout_version("0.33.1"));
        assert!(is_rollout_version("1.0.0"));
    }

    #[test]
    fn test_resolve_format_prefers_version() {
        let home = TempDir::new().unwrap();
        // Local logs say rollout, but a known old version wins.
        fs::File::create(home.path().join("history.jsonl")).unwrap();

        let ctx = CliContext { version: Some("0.31.0".to_string()), ..CliContext::unknown() };
        let (format, source) = resolve_format_detailed(&ctx, home.path());
        assert_eq!(format, SessionFormat::Legacy);
        assert_eq!(source, FormatSource::CliVersion);
    }

    #[test]
    fn test_resolve_format_falls_back_to_probe() {
        let home = TempDir::new().unwrap();
        let (format, source) = resolve_format_detailed(&CliContext::unknown(), home.path());
        assert_eq!(format, SessionFormat::Legacy);
        assert_eq!(source, FormatSource::LocalProbe);
    }

    #[test]
    fn test_probe_history_artifact_implies_rollout() {
        let home = TempDir::new().unwrap();
        fs::File::create(home.path().join("history.jsonl")).unwrap();
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Rollout);
    }

    #[test]
    fn test_probe_reads_latest_file_rollout() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2025", "11", "01"), "old.jsonl", LEGACY_META);
        write_session(home.path(), ("2025", "12", "15"), "new.jsonl", ROLLOUT_META);
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Rollout);
    }

    #[test]
    fn test_probe_reads_latest_file_legacy() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2025", "12", "15"), "old.jsonl", ROLLOUT_META);
        write_session(home.path(), ("2026", "01", "02"), "new.jsonl", LEGACY_META);
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Legacy);
    }

    #[test]
    fn test_probe_empty_tree_defaults_legacy() {
        let home = TempDir::new().unwrap();
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Legacy);
    }

    #[test]
    fn test_probe_malformed_first_line_defaults_legacy() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2026", "01", "02"), "bad.jsonl", "not json at all");
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Legacy);
    }

    #[test]
    fn test_probe_skips_non_date_directories() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2025", "06", "01"), "real.jsonl", ROLLOUT_META);
        // A stray non-numeric directory that sorts after every year.
        let stray = home.path().join("sessions").join("zzzz").join("06").join("01");
        fs::create_dir_all(&stray).unwrap();
        fs::write(stray.join("stray.jsonl"), LEGACY_META).unwrap();
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Rollout);
    }

    #[test]
    fn test_probe_picks_lexicographically_last_file_of_latest_day() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2026", "01", "02"), "a-first.jsonl", LEGACY_META);
        write_session(home.path(), ("2026", "01", "02"), "b-second.jsonl", ROLLOUT_META);
        assert_eq!(probe_local_logs(home.path()), SessionFormat::Rollout);
    }

    #[test]
    fn test_is_rollout_file() {
        let home = TempDir::new().unwrap();
        write_session(home.path(), ("2026", "01", "02"), "r.jsonl", ROLLOUT_META);
        write_session(home.path(), ("2026", "01", "02"), "l.jsonl", LEGACY_META);
        let day = home.path().join("sessions/2026/01/02");
        assert!(is_rollout_file(&day.join("r.jsonl")));
        assert!(!is_rollout_file(&day.join("l.jsonl")));
        assert!(!is_rollout_file(&day.join("missing.jsonl")));
    }

    #[test]
    fn test_is_rollout_file_skips_blank_lines() {
        let home = TempDir::new().unwrap();
        let content = format!("\n\n{ROLLOUT_META}\n");
        write_session(home.path(), ("2026", "01", "02"), "padded.jsonl", &content);
        assert!(is_rollout_file(&home.path().join("sessions/2026/01/02/padded.jsonl")));
    }
}
