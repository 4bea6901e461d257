use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use email_address::EmailAddress;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;
use uuid::Uuid;

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\(?[0-9][0-9 ()./-]{4,22}[0-9]$").expect("phone pattern is valid"));

/// Returns `true` if the provided string is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Returns `true` if the provided string parses as a UUID.
pub fn is_valid_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// Digits with an optional leading `+` or `(` and common separators.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE_PATTERN.is_match(value)
}

/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS` or an RFC 3339 timestamp.
pub fn is_valid_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn is_valid_time(value: &str) -> bool {
    NaiveTime::parse_from_str(value, "%H:%M:%S").is_ok() || NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("test@example.com"));
        assert!(!is_valid_email("invalid"));
    }

    #[test]
    fn url_validation() {
        assert!(is_valid_url("https://example.com"));
        assert!(!is_valid_url("not-a-url"));
    }

    #[test]
    fn uuid_validation() {
        assert!(is_valid_uuid("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!is_valid_uuid("not-a-uuid"));
    }

    #[test]
    fn phone_validation() {
        assert!(is_valid_phone("+32 2 555 12 34"));
        assert!(is_valid_phone("(555) 123-4567"));
        assert!(!is_valid_phone("call me"));
        assert!(!is_valid_phone("12"));
    }

    #[test]
    fn date_validation() {
        assert!(is_valid_date("2021-03-14"));
        assert!(is_valid_date("2021-03-14T09:30:00"));
        assert!(is_valid_date("2021-03-14T09:30:00+01:00"));
        assert!(!is_valid_date("2021-02-30"));
        assert!(!is_valid_date("yesterday"));
    }

    #[test]
    fn time_validation() {
        assert!(is_valid_time("09:30"));
        assert!(is_valid_time("23:59:59"));
        assert!(!is_valid_time("24:30"));
    }
}
