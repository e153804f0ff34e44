use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Requirement {
    pub id: Uuid,
    pub event_id: Uuid,
    pub requirement_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tracks one student's progress on one requirement: the student marks
/// it submitted, the department verifies it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RequirementFulfillment {
    pub registration_id: Uuid,
    pub requirement_id: Uuid,
    pub student_submitted: bool,
    pub department_verified: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Fulfillment row joined with the requirement it tracks, for the
/// student-facing checklist view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FulfillmentWithRequirement {
    pub registration_id: Uuid,
    pub requirement_id: Uuid,
    pub student_submitted: bool,
    pub department_verified: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub verified_at: Option<DateTime<Utc>>,
    pub requirement_name: String,
    pub description: Option<String>,
}
