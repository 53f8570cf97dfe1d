use std::cmp::Ordering;
use std::time::Duration;

use super::run_with_timeout;

/// Ask the binary for its version and extract the first semver-shaped token
/// (`major.minor.patch` with an optional pre-release suffix).
///
/// Returns `None` on any failure: missing binary, timeout, non-zero exit,
/// or output with no recognizable version token. Never panics or errors.
pub fn get_version(binary: &str, timeout: Duration) -> Option<String> {
    let output = run_with_timeout(binary, &["--version"], timeout)?;
    find_semver(&output).map(str::to_string)
}

/// Numeric comparison of `major.minor.patch`. Pre-release and build
/// metadata are ignored; missing components count as 0.
pub fn compare_semver(a: &str, b: &str) -> Ordering {
    release_components(a).cmp(&release_components(b))
}

fn release_components(version: &str) -> [u64; 3] {
    let core = version.split(['-', '+']).next().unwrap_or(version);
    let mut components = [0u64; 3];
    for (slot, part) in components.iter_mut().zip(core.split('.')) {
        *slot = part.trim().parse().unwrap_or(0);
    }
    components
}

/// Scan free-form text for the first `\d+\.\d+\.\d+(-pre)?` token.
fn find_semver(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start].is_ascii_digit()
            && let Some(token) = semver_at(&text[start..])
        {
            return Some(token);
        }
    }
    None
}

fn semver_at(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    // major '.' minor '.'
    for _ in 0..2 {
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == digits_start || bytes.get(pos) != Some(&b'.') {
            return None;
        }
        pos += 1;
    }

    // patch
    let digits_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos == digits_start {
        return None;
    }

    // optional pre-release: '-' followed by [0-9A-Za-z.-]+
    if bytes.get(pos) == Some(&b'-') {
        let pre_start = pos + 1;
        let mut end = pre_start;
        while end < bytes.len()
            && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'.' || bytes[end] == b'-')
        {
            end += 1;
        }
        if end > pre_start {
            pos = end;
        }
    }

    Some(&text[..pos])
}
