use sqlx::PgPool;
use uuid::Uuid;

use crate::models::registration::{
    Registration, RegistrationStatus, RegistrationWithEvent, RegistrationWithStudent,
};
use crate::utils::error::AppError;

use super::map_constraint_err;

const REGISTRATION_COLUMNS: &str = "id, event_id, student_id, status, unique_code, attended, \
                                    attended_at, approved_at, rejected_at, created_at";

const JOINED_STUDENT_COLUMNS: &str =
    "r.id, r.event_id, r.student_id, r.status, r.unique_code, r.attended, r.attended_at, \
     r.created_at, u.full_name, u.student_number, u.email";

#[derive(Debug, Clone)]
pub struct RegistrationRepo {
    pool: PgPool,
}

impl RegistrationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a registration. Free-for-all events auto-approve without
    /// issuing an attendance code; seat-limited events start Pending.
    pub async fn insert(
        &self,
        event_id: Uuid,
        student_id: Uuid,
        auto_approve: bool,
    ) -> Result<Registration, AppError> {
        let sql = if auto_approve {
            format!(
                "INSERT INTO registrations (event_id, student_id, status, approved_at) \
                 VALUES ($1, $2, 'Approved', now()) RETURNING {REGISTRATION_COLUMNS}"
            )
        } else {
            format!(
                "INSERT INTO registrations (event_id, student_id, status) \
                 VALUES ($1, $2, 'Pending') RETURNING {REGISTRATION_COLUMNS}"
            )
        };
        let registration = sqlx::query_as::<_, Registration>(&sql)
            .bind(event_id)
            .bind(student_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_constraint_err)?;
        Ok(registration)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Registration>, AppError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn find_owned(
        &self,
        id: Uuid,
        student_id: Uuid,
    ) -> Result<Option<Registration>, AppError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1 AND student_id = $2"
        ))
        .bind(id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn exists(&self, event_id: Uuid, student_id: Uuid) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND student_id = $2",
        )
        .bind(event_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    pub async fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationWithStudent>, AppError> {
        let registrations = sqlx::query_as::<_, RegistrationWithStudent>(&format!(
            "SELECT {JOINED_STUDENT_COLUMNS} FROM registrations r \
             JOIN users u ON u.id = r.student_id \
             WHERE r.event_id = $1 ORDER BY r.created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    /// Approved registrations for an event, attendees first, for the
    /// attendance report.
    pub async fn list_approved_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationWithStudent>, AppError> {
        let registrations = sqlx::query_as::<_, RegistrationWithStudent>(&format!(
            "SELECT {JOINED_STUDENT_COLUMNS} FROM registrations r \
             JOIN users u ON u.id = r.student_id \
             WHERE r.event_id = $1 AND r.status = 'Approved' \
             ORDER BY r.attended DESC, r.created_at DESC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(registrations)
    }

    pub async fn list_by_student(
        &self,
        student_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<RegistrationWithEvent>, AppError> {
        const JOINED_EVENT_COLUMNS: &str =
            "r.id, r.event_id, r.status, r.unique_code, r.attended, r.created_at, \
             e.event_name, e.location, e.date, e.start_time, e.end_time, \
             e.participant_limit, e.status AS event_status";

        let registrations = match status {
            Some(status) => {
                sqlx::query_as::<_, RegistrationWithEvent>(&format!(
                    "SELECT {JOINED_EVENT_COLUMNS} FROM registrations r \
                     JOIN events e ON e.id = r.event_id \
                     WHERE r.student_id = $1 AND r.status = $2 ORDER BY r.created_at DESC"
                ))
                .bind(student_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RegistrationWithEvent>(&format!(
                    "SELECT {JOINED_EVENT_COLUMNS} FROM registrations r \
                     JOIN events e ON e.id = r.event_id \
                     WHERE r.student_id = $1 ORDER BY r.created_at DESC"
                ))
                .bind(student_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(registrations)
    }

    pub async fn statuses_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<RegistrationStatus>, AppError> {
        let statuses = sqlx::query_scalar::<_, RegistrationStatus>(
            "SELECT status FROM registrations WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(statuses)
    }

    pub async fn statuses_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<RegistrationStatus>, AppError> {
        let statuses = sqlx::query_scalar::<_, RegistrationStatus>(
            "SELECT status FROM registrations WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(statuses)
    }

    pub async fn approved_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'Approved'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Approves a registration and stores its freshly issued attendance
    /// code.
    pub async fn approve(&self, id: Uuid, unique_code: Uuid) -> Result<Registration, AppError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET status = 'Approved', unique_code = $2, approved_at = now() \
             WHERE id = $1 RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .bind(unique_code)
        .fetch_one(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn reject(&self, id: Uuid) -> Result<Registration, AppError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "UPDATE registrations SET status = 'Rejected', unique_code = NULL, \
             rejected_at = now() WHERE id = $1 RETURNING {REGISTRATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(registration)
    }

    /// Deletes a student's own registration while it is still Pending.
    pub async fn delete_pending(&self, id: Uuid, student_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM registrations WHERE id = $1 AND student_id = $2 AND status = 'Pending'",
        )
        .bind(id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attendance lookup: straight equality on the opaque code, scoped
    /// to the event being scanned.
    pub async fn find_by_code(
        &self,
        event_id: Uuid,
        unique_code: Uuid,
    ) -> Result<Option<RegistrationWithStudent>, AppError> {
        let registration = sqlx::query_as::<_, RegistrationWithStudent>(&format!(
            "SELECT {JOINED_STUDENT_COLUMNS} FROM registrations r \
             JOIN users u ON u.id = r.student_id \
             WHERE r.unique_code = $1 AND r.event_id = $2"
        ))
        .bind(unique_code)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(registration)
    }

    pub async fn mark_attended(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE registrations SET attended = TRUE, attended_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
