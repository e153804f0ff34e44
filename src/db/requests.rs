use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::event_request::{EventRequest, RequestStatus};
use crate::scheduling::conflict::Commitment;
use crate::scheduling::store::SchedulingStore;
use crate::utils::error::AppError;

use super::map_constraint_err;

const REQUEST_COLUMNS: &str = "id, department_id, event_name, description, location, date, \
                               start_time, end_time, participant_limit, requirements, status, \
                               created_at";

const EVENT_COLUMNS: &str = "id, organizer_id, event_request_id, event_name, description, \
                             location, date, start_time, end_time, participant_limit, status, \
                             created_at";

#[derive(Debug, Clone)]
pub struct NewEventRequest {
    pub department_id: Uuid,
    pub event_name: String,
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub participant_limit: Option<i32>,
    pub requirements: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RequestRepo {
    pool: PgPool,
}

impl RequestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, new: &NewEventRequest) -> Result<EventRequest, AppError> {
        let request = sqlx::query_as::<_, EventRequest>(&format!(
            "INSERT INTO event_requests (department_id, event_name, description, location, \
             date, start_time, end_time, participant_limit, requirements, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'Pending') RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(new.department_id)
        .bind(&new.event_name)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.participant_limit)
        .bind(Json(&new.requirements))
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<EventRequest>, AppError> {
        let request = sqlx::query_as::<_, EventRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM event_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// A department's requests, optionally filtered by status, newest
    /// first.
    pub async fn list_by_department(
        &self,
        department_id: Uuid,
        status: Option<RequestStatus>,
    ) -> Result<Vec<EventRequest>, AppError> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, EventRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM event_requests WHERE department_id = $1 \
                     AND status = $2 ORDER BY created_at DESC"
                ))
                .bind(department_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM event_requests WHERE department_id = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(department_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(requests)
    }

    /// All requests (oversight view), optionally filtered by status,
    /// newest first.
    pub async fn list(&self, status: Option<RequestStatus>) -> Result<Vec<EventRequest>, AppError> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, EventRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM event_requests WHERE status = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EventRequest>(&format!(
                    "SELECT {REQUEST_COLUMNS} FROM event_requests ORDER BY created_at DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(requests)
    }

    pub async fn statuses(
        &self,
        department: Option<Uuid>,
    ) -> Result<Vec<RequestStatus>, AppError> {
        let statuses = match department {
            Some(dept) => {
                sqlx::query_scalar::<_, RequestStatus>(
                    "SELECT status FROM event_requests WHERE department_id = $1",
                )
                .bind(dept)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, RequestStatus>("SELECT status FROM event_requests")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(statuses)
    }

    /// Candidate set for conflict checks: Pending requests targeting the
    /// given location on the given date.
    pub async fn pending_at(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Vec<EventRequest>, AppError> {
        let requests = sqlx::query_as::<_, EventRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM event_requests WHERE location = $1 AND date = $2 \
             AND status = 'Pending' ORDER BY created_at ASC"
        ))
        .bind(location)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Rewrites a Pending request owned by `department_id`. Returns the
    /// updated row, or `None` when the request is missing, not owned, or
    /// no longer Pending.
    pub async fn update_pending(
        &self,
        id: Uuid,
        department_id: Uuid,
        new: &NewEventRequest,
    ) -> Result<Option<EventRequest>, AppError> {
        let request = sqlx::query_as::<_, EventRequest>(&format!(
            "UPDATE event_requests SET event_name = $3, description = $4, location = $5, \
             date = $6, start_time = $7, end_time = $8, participant_limit = $9, \
             requirements = $10 \
             WHERE id = $1 AND department_id = $2 AND status = 'Pending' \
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(department_id)
        .bind(&new.event_name)
        .bind(&new.description)
        .bind(&new.location)
        .bind(new.date)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.participant_limit)
        .bind(Json(&new.requirements))
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    /// Hard-deletes a Pending request owned by `department_id`.
    pub async fn delete_pending(&self, id: Uuid, department_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM event_requests WHERE id = $1 AND department_id = $2 \
             AND status = 'Pending'",
        )
        .bind(id)
        .bind(department_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Names the current state of a request that refused a transition.
    async fn state_error_for(&self, id: Uuid) -> AppError {
        match self.find(id).await {
            Ok(Some(request)) => request
                .status
                .ensure_pending()
                .err()
                .unwrap_or_else(|| AppError::StateError("Request already processed".into())),
            Ok(None) => AppError::NotFound("Request not found".into()),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl SchedulingStore for RequestRepo {
    async fn find_request(&self, id: Uuid) -> Result<Option<EventRequest>, AppError> {
        self.find(id).await
    }

    async fn commitments_at(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Vec<Commitment>, AppError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE location = $1 AND date = $2 \
             AND status = 'Active' ORDER BY created_at ASC"
        ))
        .bind(location)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        let requests = self.pending_at(location, date).await?;

        let mut commitments: Vec<Commitment> =
            events.iter().map(Commitment::from_event).collect();
        commitments.extend(requests.iter().map(Commitment::from_request));
        Ok(commitments)
    }

    async fn approve_and_materialize(&self, request: &EventRequest) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE event_requests SET status = 'Approved' WHERE id = $1 AND status = 'Pending'",
        )
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(self.state_error_for(request.id).await);
        }

        // The slot-exclusion constraint rejects the insert if a
        // concurrent approval booked an overlapping slot after our check.
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (organizer_id, event_request_id, event_name, description, \
             location, date, start_time, end_time, participant_limit, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'Active') RETURNING {EVENT_COLUMNS}"
        ))
        .bind(request.department_id)
        .bind(request.id)
        .bind(&request.event_name)
        .bind(&request.description)
        .bind(&request.location)
        .bind(request.date)
        .bind(request.start_time)
        .bind(request.end_time)
        .bind(request.participant_limit)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_constraint_err)?;

        for name in request.requirements.iter() {
            sqlx::query(
                "INSERT INTO event_requirements (event_id, requirement_name) VALUES ($1, $2)",
            )
            .bind(event.id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(event)
    }

    async fn transition_request(&self, id: Uuid, to: RequestStatus) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE event_requests SET status = $2 WHERE id = $1 AND status = 'Pending'",
        )
        .bind(id)
        .bind(to)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.state_error_for(id).await);
        }
        Ok(())
    }
}
