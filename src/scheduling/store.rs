use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::event::Event;
use crate::models::event_request::{EventRequest, RequestStatus};
use crate::utils::error::AppError;

use super::conflict::Commitment;

/// Persistence seam the approval state machine runs against.
///
/// The production implementation is backed by Postgres
/// (`db::requests::RequestRepo`); tests drive the same state machine
/// through an in-memory store.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn find_request(&self, id: Uuid) -> Result<Option<EventRequest>, AppError>;

    /// Every commitment booked at `location` on `date`: Active events
    /// first, then Pending requests, each in creation order.
    async fn commitments_at(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<Vec<Commitment>, AppError>;

    /// Atomically marks the request Approved, materializes the Event and
    /// copies the request's requirement list. Fails with a state error
    /// if the request is no longer Pending, and with a conflict error if
    /// a concurrent booking took the slot first.
    async fn approve_and_materialize(&self, request: &EventRequest) -> Result<Event, AppError>;

    /// Moves a Pending request to a terminal state (Rejected or
    /// Cancelled). Fails with a state error if it is no longer Pending.
    async fn transition_request(&self, id: Uuid, to: RequestStatus) -> Result<(), AppError>;
}
