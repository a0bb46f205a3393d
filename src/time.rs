//! Time related utils.

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Create a new DateTime of the current time in UTC.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format a DateTime into the Amazon Pay timestamp form: `20240719T123456Z`.
///
/// This is ISO 8601 with all `:` and `-` separators stripped.
pub fn format_pay_date(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_pay_date() {
        let t = chrono::Utc.with_ymd_and_hms(2024, 7, 19, 12, 34, 56).unwrap();
        assert_eq!(format_pay_date(t), "20240719T123456Z");
    }
}
