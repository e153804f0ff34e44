use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// The campus operates on Philippine Time (UTC+8). Event dates and times
/// are stored wall-clock in that zone, so "now" must be shifted before
/// any schedule comparison.
const CAMPUS_UTC_OFFSET_HOURS: i64 = 8;

/// Current wall-clock date and time on campus.
pub fn campus_now() -> NaiveDateTime {
    (Utc::now() + Duration::hours(CAMPUS_UTC_OFFSET_HOURS)).naive_utc()
}

/// Formats a time as 12-hour with AM/PM, e.g. `2:30 PM`.
pub fn format_time_12hr(time: NaiveTime) -> String {
    let formatted = time.format("%I:%M %p").to_string();
    formatted
        .strip_prefix('0')
        .map(str::to_string)
        .unwrap_or(formatted)
}

/// Formats a `start - end` range in 12-hour clock, e.g.
/// `2:00 PM - 4:00 PM`.
pub fn format_time_range(start: NaiveTime, end: NaiveTime) -> String {
    format!("{} - {}", format_time_12hr(start), format_time_12hr(end))
}

/// Formats a date as e.g. `December 8, 2025`.
pub fn format_date_readable(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_format_time_12hr() {
        assert_eq!(format_time_12hr(t(14, 30)), "2:30 PM");
        assert_eq!(format_time_12hr(t(9, 5)), "9:05 AM");
        assert_eq!(format_time_12hr(t(12, 0)), "12:00 PM");
        assert_eq!(format_time_12hr(t(0, 15)), "12:15 AM");
    }

    #[test]
    fn test_format_time_range() {
        assert_eq!(format_time_range(t(14, 0), t(16, 0)), "2:00 PM - 4:00 PM");
    }

    #[test]
    fn test_format_date_readable() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        assert_eq!(format_date_readable(date), "December 8, 2025");
    }
}
