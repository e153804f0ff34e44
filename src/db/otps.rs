use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::otp::{OtpPurpose, OtpRecord};
use crate::utils::error::AppError;

#[derive(Debug, Clone)]
pub struct OtpRepo {
    pool: PgPool,
}

impl OtpRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a fresh OTP for the address, dropping any previous codes
    /// so only the latest one can be redeemed.
    pub async fn replace(
        &self,
        purpose: OtpPurpose,
        email: &str,
        otp: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let table = purpose.table();
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {table} WHERE email = $1"))
            .bind(email)
            .execute(&mut *tx)
            .await?;

        sqlx::query(&format!(
            "INSERT INTO {table} (email, otp, expires_at) VALUES ($1, $2, $3)"
        ))
        .bind(email)
        .bind(otp)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Redeems an OTP: it must exist, be unconsumed and unexpired.
    /// Consumption is permanent, so a code can never be replayed.
    pub async fn verify_and_consume(
        &self,
        purpose: OtpPurpose,
        email: &str,
        otp: &str,
    ) -> Result<(), AppError> {
        let table = purpose.table();

        let record = sqlx::query_as::<_, OtpRecord>(&format!(
            "SELECT id, email, otp, expires_at, consumed, created_at FROM {table} \
             WHERE email = $1 AND otp = $2"
        ))
        .bind(email)
        .bind(otp)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid OTP code".to_string()))?;

        record
            .check_redeemable(Utc::now())
            .map_err(|rejection| AppError::ValidationError(rejection.message().to_string()))?;

        sqlx::query(&format!("UPDATE {table} SET consumed = TRUE WHERE id = $1"))
            .bind(record.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
