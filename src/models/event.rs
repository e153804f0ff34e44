use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Persisted lifecycle status of an event. The read-time
/// [`DisplayStatus`](crate::scheduling::status::DisplayStatus) may
/// supersede `Active` with `Ongoing` or `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status")]
pub enum EventStatus {
    Active,
    Cancelled,
    Completed,
}

impl EventStatus {
    /// Guard for cancellation. Cancelled and Completed are terminal.
    pub fn ensure_cancellable(self) -> Result<(), AppError> {
        match self {
            EventStatus::Active => Ok(()),
            EventStatus::Cancelled => {
                Err(AppError::StateError("Event is already cancelled.".into()))
            }
            EventStatus::Completed => Err(AppError::StateError(
                "Cannot cancel a completed event.".into(),
            )),
        }
    }

    /// Guard for postponement (date/time mutation while remaining Active).
    pub fn ensure_postponable(self) -> Result<(), AppError> {
        match self {
            EventStatus::Active => Ok(()),
            EventStatus::Cancelled => Err(AppError::StateError(
                "Cannot postpone a cancelled event.".into(),
            )),
            EventStatus::Completed => Err(AppError::StateError(
                "Cannot postpone a completed event.".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: Uuid,
    /// Set when this event was materialized from an approved request.
    pub event_request_id: Option<Uuid>,
    pub event_name: String,
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// `None` means free-for-all: unlimited seats, registrations
    /// auto-approve.
    pub participant_limit: Option<i32>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn is_free_for_all(&self) -> bool {
        self.participant_limit.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_guards() {
        assert!(EventStatus::Active.ensure_cancellable().is_ok());
        assert!(EventStatus::Cancelled.ensure_cancellable().is_err());
        assert!(EventStatus::Completed.ensure_cancellable().is_err());
    }

    #[test]
    fn test_postpone_guards() {
        assert!(EventStatus::Active.ensure_postponable().is_ok());
        assert!(EventStatus::Cancelled.ensure_postponable().is_err());
        assert!(EventStatus::Completed.ensure_postponable().is_err());
    }
}
