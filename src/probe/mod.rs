//! Probes of the external `codex` binary.
//!
//! Both probes shell out with a short hard timeout and degrade to "unknown"
//! on any failure - a missing binary must never break log browsing. The
//! results live in an explicit [`CliContext`] that is built once and passed
//! to callers; there is no process-wide cache.

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

pub mod capabilities;
pub mod version;

pub use capabilities::{Capabilities, detect_capabilities};
pub use version::{compare_semver, get_version};

/// Name of the external CLI binary on PATH.
pub const CODEX_BINARY: &str = "codex";

/// Upper bound on each subprocess probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Once-initialized probe results for one external CLI installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliContext {
    /// Semver reported by the binary, or `None` when undetectable.
    pub version: Option<String>,
    pub capabilities: Capabilities,
}

impl CliContext {
    /// Probe the default `codex` binary once.
    pub fn detect() -> Self {
        Self::detect_binary(CODEX_BINARY)
    }

    /// Probe a specific binary once (injectable for tests).
    pub fn detect_binary(binary: &str) -> Self {
        Self {
            version: get_version(binary, PROBE_TIMEOUT),
            capabilities: detect_capabilities(binary, PROBE_TIMEOUT),
        }
    }

    /// A context for installations where no binary is reachable: version
    /// unknown, every capability false.
    pub fn unknown() -> Self {
        Self { version: None, capabilities: Capabilities::default() }
    }
}

/// Run `binary args...` and capture stdout, enforcing `timeout` as a hard
/// bound. Returns `None` on spawn failure, timeout, or non-zero exit.
pub(crate) fn run_with_timeout(binary: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .ok()?;

    let mut stdout = child.stdout.take()?;
    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        let mut buf = String::new();
        let _ = stdout.read_to_string(&mut buf);
        let _ = tx.send(buf);
    });

    let deadline = Instant::now() + timeout;
    let output = rx.recv_timeout(timeout).ok();

    // Reap the child, killing it once the deadline passes. The 10ms poll
    // keeps the worst case bounded without busy-waiting.
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    break None;
                }
                thread::sleep(Duration::from_millis(10));
            }
            Err(_) => break None,
        }
    };
    let _ = reader.join();

    match (output, status) {
        (Some(out), Some(status)) if status.success() => Some(out),
        _ => None,
    }
}
