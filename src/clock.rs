// src/clock.rs
use chrono::{Local, SecondsFormat, Utc};

/// Current local time as RFC 3339 with a `+hh:mm` offset.
/// The returned string is owned by the caller.
pub fn rfc3339_now() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

pub fn current_time_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_rfc3339_now_round_trips() {
        let stamp = rfc3339_now();
        let parsed = DateTime::parse_from_rfc3339(&stamp).unwrap();
        assert_eq!(parsed.to_rfc3339_opts(SecondsFormat::Secs, false), stamp);
        // offset always has a colon, e.g. +02:00 or +00:00
        assert_eq!(&stamp[stamp.len() - 3..stamp.len() - 2], ":");
    }
}
