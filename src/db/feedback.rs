use sqlx::PgPool;
use uuid::Uuid;

use crate::models::feedback::{Feedback, FeedbackWithEvent, FeedbackWithStudent};
use crate::utils::error::AppError;

const FEEDBACK_COLUMNS: &str =
    "id, registration_id, event_id, student_id, rating, comment, created_at";

#[derive(Debug, Clone)]
pub struct FeedbackRepo {
    pool: PgPool,
}

impl FeedbackRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        registration_id: Uuid,
        event_id: Uuid,
        student_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "INSERT INTO event_feedback (registration_id, event_id, student_id, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(registration_id)
        .bind(event_id)
        .bind(student_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn update(
        &self,
        registration_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Feedback, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "UPDATE event_feedback SET rating = $2, comment = $3 \
             WHERE registration_id = $1 RETURNING {FEEDBACK_COLUMNS}"
        ))
        .bind(registration_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn find_by_registration(
        &self,
        registration_id: Uuid,
    ) -> Result<Option<Feedback>, AppError> {
        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM event_feedback WHERE registration_id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<FeedbackWithStudent>, AppError> {
        let feedback = sqlx::query_as::<_, FeedbackWithStudent>(
            "SELECT f.id, f.rating, f.comment, f.created_at, u.full_name, u.student_number \
             FROM event_feedback f JOIN users u ON u.id = f.student_id \
             WHERE f.event_id = $1 ORDER BY f.created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn ratings_for_event(&self, event_id: Uuid) -> Result<Vec<i32>, AppError> {
        let ratings =
            sqlx::query_scalar::<_, i32>("SELECT rating FROM event_feedback WHERE event_id = $1")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ratings)
    }

    pub async fn list_by_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<FeedbackWithEvent>, AppError> {
        let feedback = sqlx::query_as::<_, FeedbackWithEvent>(
            "SELECT f.id, f.rating, f.comment, f.created_at, e.event_name, e.date \
             FROM event_feedback f JOIN events e ON e.id = f.event_id \
             WHERE f.student_id = $1 ORDER BY f.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(feedback)
    }
}
