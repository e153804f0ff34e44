//! Event scheduling core: display-status derivation, slot conflict
//! detection, and the store seam the approval state machine runs against.

pub mod conflict;
pub mod status;
pub mod store;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Malformed schedule input. Parse failures are surfaced loudly instead
/// of being swallowed or treated as an implicit conflict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("malformed time '{0}': expected HH:MM or HH:MM:SS")]
    MalformedTime(String),

    #[error("malformed date '{0}': expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("start time must be earlier than end time")]
    InvertedInterval,
}

/// A proposed `(location, date, start, end)` booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub location: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Slot {
    /// Parses a slot from its textual form, accepting both `HH:MM:SS`
    /// and `HH:MM` times.
    pub fn parse(
        location: &str,
        date: &str,
        start: &str,
        end: &str,
    ) -> Result<Self, ScheduleError> {
        let slot = Self {
            location: location.to_string(),
            date: parse_date(date)?,
            start: parse_flexible_time(start)?,
            end: parse_flexible_time(end)?,
        };
        slot.validate()?;
        Ok(slot)
    }

    pub fn new(
        location: String,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        let slot = Self {
            location,
            date,
            start,
            end,
        };
        slot.validate()?;
        Ok(slot)
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.start >= self.end {
            return Err(ScheduleError::InvertedInterval);
        }
        Ok(())
    }
}

/// Parses `HH:MM:SS`, falling back to `HH:MM`.
pub fn parse_flexible_time(input: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .map_err(|_| ScheduleError::MalformedTime(input.to_string()))
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ScheduleError::MalformedDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flexible_time_both_forms() {
        let with_seconds = parse_flexible_time("14:30:00").unwrap();
        let without_seconds = parse_flexible_time("14:30").unwrap();
        assert_eq!(with_seconds, without_seconds);
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert_eq!(
            parse_flexible_time("2pm"),
            Err(ScheduleError::MalformedTime("2pm".to_string()))
        );
        assert!(parse_flexible_time("25:00").is_err());
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2025-12-08").is_ok());
        assert!(parse_date("08/12/2025").is_err());
        assert!(parse_date("2025-13-40").is_err());
    }

    #[test]
    fn test_slot_rejects_inverted_interval() {
        let err = Slot::parse("Gym", "2025-12-08", "16:00", "14:00").unwrap_err();
        assert_eq!(err, ScheduleError::InvertedInterval);

        // Zero-length slots are inverted too
        assert!(Slot::parse("Gym", "2025-12-08", "14:00", "14:00").is_err());
    }

    #[test]
    fn test_slot_parse_happy_path() {
        let slot = Slot::parse("Gym", "2025-12-08", "14:00", "16:00:00").unwrap();
        assert_eq!(slot.location, "Gym");
        assert_eq!(slot.date, NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
    }
}
