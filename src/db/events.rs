use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{Event, EventStatus};
use crate::utils::error::AppError;

use super::map_constraint_err;

const EVENT_COLUMNS: &str = "id, organizer_id, event_request_id, event_name, description, \
                             location, date, start_time, end_time, participant_limit, status, \
                             created_at";

/// Fields needed to create an event, whether directly by the oversight
/// office or by materializing an approved request.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub organizer_id: Uuid,
    pub event_request_id: Option<Uuid>,
    pub event_name: String,
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub participant_limit: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct EventRepo {
    pool: PgPool,
}

impl EventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: &NewEvent) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (organizer_id, event_request_id, event_name, description, \
             location, date, start_time, end_time, participant_limit, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'Active') RETURNING {EVENT_COLUMNS}"
        ))
        .bind(new.organizer_id)
        .bind(new.event_request_id)
        .bind(&new.event_name)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.participant_limit)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_err)?;
        Ok(event)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// All events, optionally restricted to one organizer, soonest first.
    pub async fn list(&self, organizer: Option<Uuid>) -> Result<Vec<Event>, AppError> {
        let events = match organizer {
            Some(org) => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 \
                     ORDER BY date ASC, start_time ASC"
                ))
                .bind(org)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events ORDER BY date ASC, start_time ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(events)
    }

    /// Active events, optionally restricted to one organizer.
    pub async fn list_active(&self, organizer: Option<Uuid>) -> Result<Vec<Event>, AppError> {
        let events = match organizer {
            Some(org) => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'Active' \
                     AND organizer_id = $1 ORDER BY date ASC, start_time ASC"
                ))
                .bind(org)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Event>(&format!(
                    "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'Active' \
                     ORDER BY date ASC, start_time ASC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(events)
    }

    /// Candidate set for conflict checks: Active events holding the
    /// given location on the given date.
    pub async fn active_at(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE location = $1 AND date = $2 \
             AND status = 'Active' ORDER BY created_at ASC"
        ))
        .bind(location)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET status = 'Cancelled' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Write-back for the reconciliation sweep: flips an Active row to
    /// Completed. Returns whether a row actually changed, so repeated
    /// calls are harmless.
    pub async fn complete_if_active(&self, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE events SET status = 'Completed' WHERE id = $1 AND status = 'Active'")
                .bind(id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_schedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE events SET date = $2, start_time = $3, end_time = $4 WHERE id = $1")
            .bind(id)
            .bind(date)
            .bind(start_time)
            .bind(end_time)
            .execute(&self.pool)
            .await
            .map_err(map_constraint_err)?;
        Ok(())
    }

    /// Stored statuses for dashboard tallies.
    pub async fn statuses(&self, organizer: Option<Uuid>) -> Result<Vec<EventStatus>, AppError> {
        let statuses = match organizer {
            Some(org) => {
                sqlx::query_scalar::<_, EventStatus>(
                    "SELECT status FROM events WHERE organizer_id = $1",
                )
                .bind(org)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, EventStatus>("SELECT status FROM events")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(statuses)
    }
}
