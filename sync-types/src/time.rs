//! Wire timestamps: naive UTC ISO-8601.
//!
//! Written as `YYYY-MM-DDTHH:MM:SS.ffffff`, with the fractional part omitted
//! when it is zero. Readers accept any fractional precision, and also a
//! trailing UTC offset from peers that emit full RFC 3339.

use chrono::{DateTime, NaiveDateTime, Timelike};

/// Format a UTC instant for the wire.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    if at.nanosecond() / 1_000 == 0 {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Parse a wire timestamp. Returns `None` if it is not ISO-8601.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn formats_with_microseconds() {
        assert_eq!(format_timestamp(at(9, 26, 53, 589_793)), "2025-03-14T09:26:53.589793");
        assert_eq!(format_timestamp(at(9, 26, 53, 7)), "2025-03-14T09:26:53.000007");
    }

    #[test]
    fn omits_zero_fraction() {
        assert_eq!(format_timestamp(at(0, 0, 0, 0)), "2025-03-14T00:00:00");
    }

    #[test]
    fn parse_roundtrip() {
        let t = at(23, 59, 59, 123_456);
        assert_eq!(parse_timestamp(&format_timestamp(t)), Some(t));
        let t = at(12, 0, 0, 0);
        assert_eq!(parse_timestamp(&format_timestamp(t)), Some(t));
    }

    #[test]
    fn parse_accepts_offsets() {
        assert_eq!(
            parse_timestamp("2025-03-14T10:26:53+01:00"),
            Some(at(9, 26, 53, 0))
        );
        assert_eq!(parse_timestamp("2025-03-14T09:26:53Z"), Some(at(9, 26, 53, 0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_timestamp("tomorrow"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2025-13-40T99:00:00"), None);
    }
}
