use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::event::{Event, EventStatus};

/// Read-time lifecycle state. Unlike the persisted [`EventStatus`] it can
/// report `Ongoing`, and it reports `Completed` for Active events whose
/// schedule has already passed even before the write-back sweep runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayStatus {
    Active,
    Ongoing,
    Completed,
    Cancelled,
}

/// Derives the status to show and act upon from the stored status and
/// schedule, evaluated against `now` in campus wall-clock time.
///
/// Cancelled and Completed pass through unchanged; only Active events
/// are reinterpreted against the clock. Idempotent: derived output never
/// feeds back into the inputs.
pub fn derive_display_status(
    stored: EventStatus,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    now: NaiveDateTime,
) -> DisplayStatus {
    match stored {
        EventStatus::Cancelled => DisplayStatus::Cancelled,
        EventStatus::Completed => DisplayStatus::Completed,
        EventStatus::Active => {
            let today = now.date();
            if date > today {
                DisplayStatus::Active
            } else if date == today {
                let current = now.time();
                if current >= start_time && current <= end_time {
                    DisplayStatus::Ongoing
                } else if current > end_time {
                    DisplayStatus::Completed
                } else {
                    // Scheduled later today
                    DisplayStatus::Active
                }
            } else {
                DisplayStatus::Completed
            }
        }
    }
}

impl Event {
    pub fn display_status(&self, now: NaiveDateTime) -> DisplayStatus {
        derive_display_status(self.status, self.date, self.start_time, self.end_time, now)
    }
}

/// Per-display-status counters used by dashboards and list filters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct DisplayStatusCounts {
    pub active: i64,
    pub ongoing: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl DisplayStatusCounts {
    pub fn tally<'a>(events: impl IntoIterator<Item = &'a Event>, now: NaiveDateTime) -> Self {
        let mut counts = Self::default();
        for event in events {
            match event.display_status(now) {
                DisplayStatus::Active => counts.active += 1,
                DisplayStatus::Ongoing => counts.ongoing += 1,
                DisplayStatus::Completed => counts.completed += 1,
                DisplayStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
        date.and_time(time)
    }

    const DATE: (i32, u32, u32) = (2025, 12, 8);

    fn derive(stored: EventStatus, now: NaiveDateTime) -> DisplayStatus {
        let (y, m, day) = DATE;
        derive_display_status(stored, d(y, m, day), t(14, 0), t(16, 0), now)
    }

    #[test]
    fn test_terminal_statuses_pass_through() {
        let now = at(d(2025, 12, 8), t(15, 0));
        assert_eq!(derive(EventStatus::Cancelled, now), DisplayStatus::Cancelled);
        assert_eq!(derive(EventStatus::Completed, now), DisplayStatus::Completed);
    }

    #[test]
    fn test_future_date_is_active() {
        let now = at(d(2025, 12, 7), t(23, 59));
        assert_eq!(derive(EventStatus::Active, now), DisplayStatus::Active);
    }

    #[test]
    fn test_past_date_is_completed_regardless_of_time() {
        for time in [t(0, 0), t(12, 0), t(23, 59)] {
            let now = at(d(2025, 12, 9), time);
            assert_eq!(derive(EventStatus::Active, now), DisplayStatus::Completed);
        }
    }

    #[test]
    fn test_same_day_before_start_is_active() {
        let now = at(d(2025, 12, 8), t(13, 59));
        assert_eq!(derive(EventStatus::Active, now), DisplayStatus::Active);
    }

    #[test]
    fn test_same_day_within_window_is_ongoing() {
        // Window boundaries are inclusive
        for time in [t(14, 0), t(15, 0), t(16, 0)] {
            let now = at(d(2025, 12, 8), time);
            assert_eq!(derive(EventStatus::Active, now), DisplayStatus::Ongoing);
        }
    }

    #[test]
    fn test_same_day_after_end_is_completed() {
        let now = at(d(2025, 12, 8), t(16, 1));
        assert_eq!(derive(EventStatus::Active, now), DisplayStatus::Completed);
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let now = at(d(2025, 12, 8), t(15, 0));
        let first = derive(EventStatus::Active, now);
        let second = derive(EventStatus::Active, now);
        assert_eq!(first, second);
    }
}
