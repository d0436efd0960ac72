//! Field coercion for loosely typed usage rows.
//!
//! Every accessor here is total: a missing, null or malformed value degrades to
//! a default instead of failing, so one bad row never breaks a whole pass.

use serde_json::Value;

use crate::models::{Record, CLIENT_FIELD, OVERALL_SCORE_FIELD, RM_FIELD};

pub const UNKNOWN_KEY: &str = "Unknown";

/// Numeric value of `field`, or 0 when it is absent, null or not a number.
///
/// Infinities survive; only NaN collapses to 0 so ordering stays total.
pub fn normalize_score(record: &Record, field: &str) -> f64 {
    let parsed = match record.get(field) {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => parse_leading_float(text),
        _ => None,
    };

    match parsed {
        Some(value) if !value.is_nan() => value,
        _ => 0.0,
    }
}

pub fn score_of(record: &Record) -> f64 {
    normalize_score(record, OVERALL_SCORE_FIELD)
}

pub fn client_of(record: &Record) -> String {
    text_of(record, CLIENT_FIELD).unwrap_or_default()
}

pub fn rm_of(record: &Record) -> String {
    key_of(record, RM_FIELD)
}

/// Categorical value of `field`, with `"Unknown"` standing in for missing or blank keys.
pub fn key_of(record: &Record, field: &str) -> String {
    text_of(record, field)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| UNKNOWN_KEY.to_string())
}

fn text_of(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Parses the longest numeric prefix of `text`, so `"12.5%"` reads as 12.5.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if trimmed[end..].starts_with("Infinity") {
        let infinity = if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Some(infinity);
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    trimmed[..end].parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(score: impl Into<Value>) -> Record {
        Record::new()
            .with("Client", "North Campus")
            .with("Overall Score", score)
    }

    #[test]
    fn numeric_and_string_scores_parse() {
        assert_eq!(score_of(&row(21)), 21.0);
        assert_eq!(score_of(&row(17.25)), 17.25);
        assert_eq!(score_of(&row("12.5")), 12.5);
        assert_eq!(score_of(&row("  8")), 8.0);
    }

    #[test]
    fn malformed_scores_default_to_zero() {
        assert_eq!(score_of(&row("N/A")), 0.0);
        assert_eq!(score_of(&row("")), 0.0);
        assert_eq!(score_of(&row(Value::Null)), 0.0);
        assert_eq!(score_of(&row(true)), 0.0);
        assert_eq!(score_of(&Record::new().with("Client", "X")), 0.0);
    }

    #[test]
    fn out_of_range_values_are_not_clamped() {
        assert_eq!(score_of(&row("-3.5")), -3.5);
        assert_eq!(score_of(&row(42)), 42.0);
    }

    #[test]
    fn nan_defaults_to_zero_but_infinities_survive() {
        assert_eq!(score_of(&row("NaN")), 0.0);
        assert_eq!(score_of(&row("inf")), 0.0);
        assert_eq!(score_of(&row("1e400")), f64::INFINITY);
        assert_eq!(score_of(&row("-1e400")), f64::NEG_INFINITY);
        assert_eq!(score_of(&row("Infinity")), f64::INFINITY);
        assert_eq!(score_of(&row("-Infinity pts")), f64::NEG_INFINITY);
    }

    #[test]
    fn leading_numeric_prefix_is_used() {
        assert_eq!(parse_leading_float("12.5%"), Some(12.5));
        assert_eq!(parse_leading_float("7 pts"), Some(7.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("3."), Some(3.0));
        assert_eq!(parse_leading_float("2e3x"), Some(2000.0));
        assert_eq!(parse_leading_float("4e"), Some(4.0));
        assert_eq!(parse_leading_float("-"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("score 9"), None);
    }

    #[test]
    fn rm_defaults_to_unknown() {
        assert_eq!(rm_of(&Record::new()), "Unknown");
        assert_eq!(rm_of(&Record::new().with("RM", "")), "Unknown");
        assert_eq!(rm_of(&Record::new().with("RM", Value::Null)), "Unknown");
        assert_eq!(rm_of(&Record::new().with("RM", "Priya")), "Priya");
    }

    #[test]
    fn client_name_falls_back_to_empty() {
        assert_eq!(client_of(&row(1)), "North Campus");
        assert_eq!(client_of(&Record::new()), "");
        assert_eq!(client_of(&Record::new().with("Client", 1042)), "1042");
    }
}
