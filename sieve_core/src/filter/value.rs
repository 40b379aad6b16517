//! Raw value coercion: timestamps, scalars, LIKE escaping

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Value, json};

/// Parse a timestamp string into `(seconds, nanos)` since the Unix epoch.
///
/// Layouts tried in order: RFC 3339, `YYYY-MM-DD HH:MM:SS` (read as UTC),
/// and a bare `YYYY-MM-DD` date at midnight UTC. Bare epoch seconds are
/// deliberately not inferred; a plain number stays a number.
pub fn parse_timestamp(raw: &str) -> Option<(i64, u32)> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some((dt.timestamp(), dt.timestamp_subsec_nanos()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some((dt.and_utc().timestamp(), 0));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some((midnight.and_utc().timestamp(), 0));
    }
    None
}

/// Coerce a raw string into the richest JSON scalar it can represent.
///
/// Tries timestamp, integer, float, then the literal booleans `true` and
/// `false`; `"1"`/`"0"` stay numeric so they cannot shadow numeric fields.
/// Anything unrecognized falls back to the original string, never an error.
pub fn coerce_scalar(raw: &str) -> Value {
    if let Some((seconds, nanos)) = parse_timestamp(raw) {
        return json!({ "seconds": seconds, "nanos": nanos });
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return Value::from(float);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::from(raw),
    }
}

/// Lenient boolean reading for `fold`/`isNull` positions.
pub fn coerce_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

/// Backslash-escape LIKE wildcards before building a pattern.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
