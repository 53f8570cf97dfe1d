use std::time::Duration;

use serde::Serialize;

use super::run_with_timeout;

/// Flag substrings looked for in the CLI's help output.
const RESUME_FLAG: &str = "resume";
const CONTINUE_FLAG: &str = "--continue";
const SESSION_ID_FLAG: &str = "--session-id";

/// Which session-related features the installed CLI advertises.
///
/// The default is all-false: when the binary cannot be probed, callers must
/// assume nothing is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Capabilities {
    pub resume: bool,
    pub continue_session: bool,
    pub session_id: bool,
}

/// Run the CLI's help flag once and pattern-match literal flag substrings.
///
/// Any failure (missing binary, timeout, non-zero exit) yields the
/// all-false capability set rather than an error.
pub fn detect_capabilities(binary: &str, timeout: Duration) -> Capabilities {
    let Some(help) = run_with_timeout(binary, &["--help"], timeout) else {
        return Capabilities::default();
    };
    capabilities_from_help(&help)
}

fn capabilities_from_help(help: &str) -> Capabilities {
    Capabilities {
        resume: help.contains(RESUME_FLAG),
        continue_session: help.contains(CONTINUE_FLAG),
        session_id: help.contains(SESSION_ID_FLAG),
    }
}
