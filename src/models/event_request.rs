use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Lifecycle of a department's event request. `Pending` is the only
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Approval, rejection, edits and cancellation are only legal from
    /// `Pending`; anything else names the current state.
    pub fn ensure_pending(self) -> Result<(), AppError> {
        match self {
            RequestStatus::Pending => Ok(()),
            other => Err(AppError::StateError(format!(
                "Request already {}",
                other.as_str().to_lowercase()
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRequest {
    pub id: Uuid,
    pub department_id: Uuid,
    pub event_name: String,
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub participant_limit: Option<i32>,
    /// Requirement names to be materialized alongside the event on
    /// approval.
    pub requirements: Json<Vec<String>>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_pending_only_from_pending() {
        assert!(RequestStatus::Pending.ensure_pending().is_ok());

        for status in [
            RequestStatus::Approved,
            RequestStatus::Rejected,
            RequestStatus::Cancelled,
        ] {
            let err = status.ensure_pending().unwrap_err();
            let AppError::StateError(msg) = err else {
                panic!("expected state error");
            };
            assert!(msg.contains(&status.as_str().to_lowercase()));
        }
    }
}
