//! Field rules shared by the profile and appointment cells.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"))
}

fn time_pattern() -> &'static Regex {
    static TIME: OnceLock<Regex> = OnceLock::new();
    TIME.get_or_init(|| Regex::new(r"^([01][0-9]|2[0-3]):([0-5][0-9])$").expect("time pattern is valid"))
}

/// Trim, lowercase, then check the basic `a@b.c` shape.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if email_pattern().is_match(&email) {
        Ok(email)
    } else {
        Err(format!("Invalid email format: {}", raw.trim()))
    }
}

/// Lookup key for an email taken from a path segment: trimmed and lowercased
/// so it compares against stored identity keys, without rejecting the shape.
pub fn email_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trimmed, non-blank text.
pub fn require_text(field: &str, value: Option<&str>) -> Result<String, String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(format!("{} is required", field)),
    }
}

/// `HH:MM`, 24-hour clock.
pub fn validate_time(raw: &str) -> Result<String, String> {
    let time = raw.trim();
    if time_pattern().is_match(time) {
        Ok(time.to_string())
    } else {
        Err("Invalid time format (expected HH:MM in 24-hour format)".to_string())
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose calendar date is kept.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let value = raw.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|ts| ts.date_naive()))
        .map_err(|_| "Invalid date format".to_string())
}

/// Day-first display format used by the doctor history view.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  P@X.com ").unwrap(), "p@x.com");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a b@x.com").is_err());
        assert!(normalize_email("a@x").is_err());
    }

    #[test]
    fn time_must_be_24_hour_hh_mm() {
        assert_eq!(validate_time("09:00").unwrap(), "09:00");
        assert_eq!(validate_time("23:59").unwrap(), "23:59");
        assert!(validate_time("24:00").is_err());
        assert!(validate_time("9:00").is_err());
        assert!(validate_time("09:60").is_err());
        assert!(validate_time("0\u{669}:0\u{660}").is_err());
    }

    #[test]
    fn dates_accept_plain_and_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date("2024-01-01").unwrap(), expected);
        assert_eq!(parse_date("2024-01-01T09:00:00Z").unwrap(), expected);
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn display_date_is_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_display_date(date), "07/03/2024");
    }

    #[test]
    fn blank_text_is_rejected() {
        assert_eq!(require_text("name", Some("  Dr. X ")).unwrap(), "Dr. X");
        assert!(require_text("name", Some("   ")).is_err());
        assert!(require_text("name", None).is_err());
    }
}
