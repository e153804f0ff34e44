use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegistrationStatus {
    /// Approval and rejection decisions are only legal while Pending;
    /// Rejected in particular is terminal.
    pub fn ensure_pending(self) -> Result<(), crate::utils::error::AppError> {
        match self {
            RegistrationStatus::Pending => Ok(()),
            RegistrationStatus::Approved => Err(crate::utils::error::AppError::StateError(
                "Registration already approved".to_string(),
            )),
            RegistrationStatus::Rejected => Err(crate::utils::error::AppError::StateError(
                "Registration already rejected".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub student_id: Uuid,
    pub status: RegistrationStatus,
    /// Opaque single-use attendance token, issued on approval and shown
    /// to the student as a QR code.
    pub unique_code: Option<Uuid>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Registration row joined with the registered student's details, used
/// by department-facing listings and attendance reports.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationWithStudent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub student_id: Uuid,
    pub status: RegistrationStatus,
    pub unique_code: Option<Uuid>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub student_number: Option<String>,
    pub email: String,
}

/// Registration row joined with its event, for the student's own
/// registrations view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RegistrationWithEvent {
    pub id: Uuid,
    pub event_id: Uuid,
    pub status: RegistrationStatus,
    pub unique_code: Option<Uuid>,
    pub attended: bool,
    pub created_at: DateTime<Utc>,
    pub event_name: String,
    pub location: String,
    pub date: chrono::NaiveDate,
    pub start_time: chrono::NaiveTime,
    pub end_time: chrono::NaiveTime,
    pub participant_limit: Option<i32>,
    pub event_status: crate::models::event::EventStatus,
}

/// Per-status registration counters for an event or a student.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RegistrationCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl RegistrationCounts {
    pub fn total(&self) -> i64 {
        self.pending + self.approved + self.rejected
    }

    pub fn tally(statuses: impl IntoIterator<Item = RegistrationStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                RegistrationStatus::Pending => counts.pending += 1,
                RegistrationStatus::Approved => counts.approved += 1,
                RegistrationStatus::Rejected => counts.rejected += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let counts = RegistrationCounts::tally([
            RegistrationStatus::Pending,
            RegistrationStatus::Approved,
            RegistrationStatus::Approved,
            RegistrationStatus::Rejected,
        ]);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.total(), 4);
    }
}
