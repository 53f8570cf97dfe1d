use std::path::Path;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Lenient timestamp decoding shared by both schemas.
///
/// Accepts RFC3339 strings, integer epochs (milliseconds when the magnitude
/// says so, seconds otherwise), and fractional epoch seconds. Returns `None`
/// for anything else; callers fall back to synthesis.
pub fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                // 10^12 ms is Sep 2001; any real epoch-seconds value is far below it.
                if int.abs() >= 1_000_000_000_000 {
                    DateTime::from_timestamp_millis(int)
                } else {
                    DateTime::from_timestamp(int, 0)
                }
            } else {
                let secs = n.as_f64()?;
                DateTime::from_timestamp_millis((secs * 1000.0) as i64)
            }
        }
        Value::String(s) => s.parse::<DateTime<Utc>>().ok(),
        _ => None,
    }
}

/// Parse a JSON string leniently, returning `None` instead of erroring.
pub fn lenient_json(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

/// File modification time, falling back to the current instant when the
/// metadata is unreadable.
pub fn file_mtime(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}
