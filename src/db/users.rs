use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::User;
use crate::utils::error::AppError;

const USER_COLUMNS: &str = "id, full_name, email, password_hash, role, student_number, \
                            department_name, email_verified, created_at";

#[derive(Debug, Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_student(
        &self,
        full_name: &str,
        email: &str,
        password_hash: &str,
        student_number: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (full_name, email, password_hash, role, student_number) \
             VALUES ($1, $2, $3, 'student', $4) RETURNING {USER_COLUMNS}"
        ))
        .bind(full_name)
        .bind(email)
        .bind(password_hash)
        .bind(student_number)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn student_number_taken(&self, student_number: &str) -> Result<bool, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE student_number = $1")
                .bind(student_number)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn mark_email_verified(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET email_verified = TRUE WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, email: &str, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE email = $1")
            .bind(email)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
