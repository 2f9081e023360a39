//! Relative release-time conversion
//!
//! The source sites publish chapter dates as relative strings ("7 years
//! ago", "2 days ago"). Records need an absolute timestamp, so the string is
//! converted against the current clock; anything unparseable falls back to
//! "now" rather than failing the chapter.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s+(year|month|week|day|hour|minute)s?\s+ago").expect("valid regex")
});

/// Converts a relative time string to an absolute timestamp
pub fn parse_relative_time(text: &str) -> DateTime<Utc> {
    parse_relative_time_at(text, Utc::now())
}

/// Conversion against an explicit "now", for deterministic tests
pub fn parse_relative_time_at(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let caps = match RELATIVE.captures(text) {
        Some(c) => c,
        None => return now,
    };

    let amount: i64 = match caps[1].parse() {
        Ok(n) => n,
        Err(_) => return now,
    };

    let delta = match caps[2].to_lowercase().as_str() {
        "year" => Duration::days(amount * 365),
        "month" => Duration::days(amount * 30),
        "week" => Duration::weeks(amount),
        "day" => Duration::days(amount),
        "hour" => Duration::hours(amount),
        "minute" => Duration::minutes(amount),
        _ => Duration::zero(),
    };

    now - delta
}
