//! Human duration parsing.
//!
//! Accepts strings like `25`, `25m`, `90 sec` or `1h` and turns them into a
//! whole number of seconds. A bare number is read as minutes.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::DurationError;

/// Shortest accepted duration, in seconds.
pub const MIN_DURATION_SECS: u64 = 10;
/// Longest accepted duration, in seconds (four hours).
pub const MAX_DURATION_SECS: u64 = 4 * 60 * 60;

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<value>\d+)?\s*(?P<unit>[A-Za-z]+)?$").expect("duration pattern is valid")
    })
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3600),
        _ => None,
    }
}

/// Parse a duration string into seconds.
///
/// Empty input is reported as [`DurationError::Empty`], which callers read
/// as "use the default". Values outside
/// [`MIN_DURATION_SECS`]..=[`MAX_DURATION_SECS`] are rejected even when the
/// syntax is fine.
pub fn parse_duration(text: &str) -> Result<u64, DurationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }

    let caps = duration_pattern()
        .captures(trimmed)
        .ok_or_else(|| DurationError::Syntax(trimmed.to_string()))?;

    let value: u64 = caps
        .name("value")
        .ok_or_else(|| DurationError::Syntax(trimmed.to_string()))?
        .as_str()
        .parse()
        .map_err(|_| DurationError::Syntax(trimmed.to_string()))?;

    let multiplier = match caps.name("unit") {
        Some(unit) => {
            unit_seconds(unit.as_str()).ok_or_else(|| DurationError::Syntax(trimmed.to_string()))?
        }
        None => 60,
    };

    let seconds = value
        .checked_mul(multiplier)
        .ok_or(DurationError::OutOfRange(u64::MAX))?;

    if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&seconds) {
        return Err(DurationError::OutOfRange(seconds));
    }

    Ok(seconds)
}

/// Parse a duration, falling back to `default_secs` on any failure.
pub fn parse_duration_or(text: &str, default_secs: u64) -> u64 {
    match parse_duration(text) {
        Ok(secs) => secs,
        Err(DurationError::Empty) => default_secs,
        Err(e) => {
            tracing::debug!("falling back to {default_secs}s: {e}");
            default_secs
        }
    }
}

/// Format seconds as `M:SS`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
