//! Record identifiers.
//!
//! An identifier is the creation time in milliseconds since the Unix epoch.
//! Two creations within the same millisecond get the same value; existing
//! files depend on this numeric shape, so it is kept as is.

use chrono::Utc;

/// Current time in milliseconds since the epoch.
pub fn next_id() -> i64 {
    Utc::now().timestamp_millis()
}

/// Parse a path identifier as a base-10 integer (surrounding whitespace allowed).
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_epoch_millis() {
        let before = Utc::now().timestamp_millis();
        let id = next_id();
        let after = Utc::now().timestamp_millis();
        assert!(before <= id && id <= after);
    }

    #[test]
    fn parse_id_accepts_integers_only() {
        assert_eq!(parse_id("1700000000000"), Some(1_700_000_000_000));
        assert_eq!(parse_id(" 42 "), Some(42));
        assert_eq!(parse_id("-7"), Some(-7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("12abc"), None);
        assert_eq!(parse_id("1.5"), None);
        assert_eq!(parse_id(""), None);
    }
}
