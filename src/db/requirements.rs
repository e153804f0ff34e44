use sqlx::PgPool;
use uuid::Uuid;

use crate::models::requirement::{FulfillmentWithRequirement, Requirement};
use crate::utils::error::AppError;

const REQUIREMENT_COLUMNS: &str = "id, event_id, requirement_name, description, created_at";

#[derive(Debug, Clone)]
pub struct RequirementRepo {
    pool: PgPool,
}

impl RequirementRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        event_id: Uuid,
        requirement_name: &str,
        description: Option<&str>,
    ) -> Result<Requirement, AppError> {
        let requirement = sqlx::query_as::<_, Requirement>(&format!(
            "INSERT INTO event_requirements (event_id, requirement_name, description) \
             VALUES ($1, $2, $3) RETURNING {REQUIREMENT_COLUMNS}"
        ))
        .bind(event_id)
        .bind(requirement_name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(requirement)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Requirement>, AppError> {
        let requirement = sqlx::query_as::<_, Requirement>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM event_requirements WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(requirement)
    }

    pub async fn list_by_event(&self, event_id: Uuid) -> Result<Vec<Requirement>, AppError> {
        let requirements = sqlx::query_as::<_, Requirement>(&format!(
            "SELECT {REQUIREMENT_COLUMNS} FROM event_requirements WHERE event_id = $1 \
             ORDER BY created_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requirements)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM event_requirements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn fulfillments_for_registration(
        &self,
        registration_id: Uuid,
    ) -> Result<Vec<FulfillmentWithRequirement>, AppError> {
        let fulfillments = sqlx::query_as::<_, FulfillmentWithRequirement>(
            "SELECT rr.registration_id, rr.requirement_id, rr.student_submitted, \
             rr.department_verified, rr.submitted_at, rr.verified_at, \
             er.requirement_name, er.description \
             FROM registration_requirements rr \
             JOIN event_requirements er ON er.id = rr.requirement_id \
             WHERE rr.registration_id = $1 ORDER BY er.created_at ASC",
        )
        .bind(registration_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fulfillments)
    }

    /// Student marks a requirement submitted; creates the tracking row
    /// if registration predates the requirement.
    pub async fn mark_submitted(
        &self,
        registration_id: Uuid,
        requirement_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO registration_requirements \
             (registration_id, requirement_id, student_submitted, submitted_at) \
             VALUES ($1, $2, TRUE, now()) \
             ON CONFLICT (registration_id, requirement_id) \
             DO UPDATE SET student_submitted = TRUE, submitted_at = now()",
        )
        .bind(registration_id)
        .bind(requirement_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Department verifies (or unverifies) a submitted requirement.
    pub async fn set_verified(
        &self,
        registration_id: Uuid,
        requirement_id: Uuid,
        verified: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO registration_requirements \
             (registration_id, requirement_id, department_verified, verified_at) \
             VALUES ($1, $2, $3, CASE WHEN $3 THEN now() ELSE NULL END) \
             ON CONFLICT (registration_id, requirement_id) \
             DO UPDATE SET department_verified = $3, \
             verified_at = CASE WHEN $3 THEN now() ELSE NULL END",
        )
        .bind(registration_id)
        .bind(requirement_id)
        .bind(verified)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Seeds tracking rows for every requirement of the event the
    /// student just registered for.
    pub async fn init_for_registration(
        &self,
        registration_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO registration_requirements (registration_id, requirement_id) \
             SELECT $1, id FROM event_requirements WHERE event_id = $2 \
             ON CONFLICT (registration_id, requirement_id) DO NOTHING",
        )
        .bind(registration_id)
        .bind(event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// True when every requirement of the registration's event has been
    /// verified; vacuously true for events without requirements.
    pub async fn all_verified(&self, registration_id: Uuid) -> Result<bool, AppError> {
        let (total, verified): (i64, i64) = sqlx::query_as(
            "SELECT \
             (SELECT COUNT(*) FROM event_requirements er \
              JOIN registrations r ON r.event_id = er.event_id WHERE r.id = $1), \
             (SELECT COUNT(*) FROM registration_requirements rr \
              WHERE rr.registration_id = $1 AND rr.department_verified)",
        )
        .bind(registration_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(verified >= total)
    }
}
