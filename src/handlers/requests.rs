use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::requests::NewEventRequest;
use crate::handlers::extract::{DepartmentUser, OsasUser};
use crate::models::event_request::{EventRequest, RequestStatus};
use crate::scheduling::conflict::ConflictItem;
use crate::scheduling::{parse_date, parse_flexible_time};
use crate::services::event_service::EventView;
use crate::services::request_service::RequestStatusCounts;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct RequestPayload {
    pub event_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub participant_limit: Option<i32>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl RequestPayload {
    fn into_new_request(self, department_id: Uuid) -> Result<NewEventRequest, AppError> {
        if self.event_name.trim().is_empty() || self.location.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Please fill in all required fields".to_string(),
            ));
        }
        if matches!(self.participant_limit, Some(limit) if limit <= 0) {
            return Err(AppError::ValidationError(
                "Participant limit must be a positive number".to_string(),
            ));
        }

        Ok(NewEventRequest {
            department_id,
            event_name: self.event_name.trim().to_string(),
            description: self.description,
            location: self.location.trim().to_string(),
            date: parse_date(&self.date)?,
            start_time: parse_flexible_time(&self.start_time)?,
            end_time: parse_flexible_time(&self.end_time)?,
            participant_limit: self.participant_limit,
            requirements: self.requirements,
        })
    }
}

/// `POST /api/requests` — a department submits an event request. The
/// slot is conflict-checked up front against Active events and other
/// Pending requests.
pub async fn submit_request(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Json(payload): Json<RequestPayload>,
) -> Result<Response, AppError> {
    let new = payload.into_new_request(user.id)?;
    let request = state.requests().submit(new).await?;
    Ok(created(
        request,
        "Event request submitted successfully. Awaiting OSAS approval",
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
}

#[derive(Serialize)]
struct RequestListing {
    requests: Vec<EventRequest>,
    counts: RequestStatusCounts,
}

/// `GET /api/requests` — the department's own requests with counts.
pub async fn my_requests(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Query(filter): Query<StatusFilter>,
) -> Result<Response, AppError> {
    let service = state.requests();
    let requests = service.list_for_department(user.id, filter.status).await?;
    let counts = service.status_counts(Some(user.id)).await?;
    Ok(success(RequestListing { requests, counts }, "Event requests").into_response())
}

#[derive(Serialize)]
struct ReviewedRequest {
    #[serde(flatten)]
    request: EventRequest,
    conflicts: Vec<ConflictItem>,
}

#[derive(Serialize)]
struct ReviewListing {
    requests: Vec<ReviewedRequest>,
    counts: RequestStatusCounts,
}

/// `GET /api/requests/all` — oversight view of every request, each
/// Pending one annotated with its current conflicts.
pub async fn all_requests(
    State(state): State<AppState>,
    OsasUser(_user): OsasUser,
    Query(filter): Query<StatusFilter>,
) -> Result<Response, AppError> {
    let service = state.requests();
    let requests = service.list(filter.status).await?;
    let mut conflicts = service.conflicts_for_requests(&requests).await?;
    let counts = service.status_counts(None).await?;

    let requests = requests
        .into_iter()
        .map(|request| ReviewedRequest {
            conflicts: conflicts.remove(&request.id).unwrap_or_default(),
            request,
        })
        .collect();

    Ok(success(
        ReviewListing { requests, counts },
        "All event requests",
    )
    .into_response())
}

/// `GET /api/requests/:id`
pub async fn get_request(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(request_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let request = state.requests().find_owned(request_id, user.id).await?;
    Ok(success(request, "Request details").into_response())
}

/// `PUT /api/requests/:id` — edit a Pending request; the slot is
/// re-checked with the request itself excluded.
pub async fn edit_request(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<RequestPayload>,
) -> Result<Response, AppError> {
    let new = payload.into_new_request(user.id)?;
    let request = state.requests().edit(request_id, user.id, new).await?;
    Ok(success(request, "Request updated successfully").into_response())
}

/// `POST /api/requests/:id/cancel` — Pending only; the request stays in
/// history as Cancelled.
pub async fn cancel_request(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(request_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.requests().cancel(request_id, user.id).await?;
    Ok(empty_success("Request cancelled successfully. It will remain in your history")
        .into_response())
}

/// `DELETE /api/requests/:id` — Pending only.
pub async fn delete_request(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(request_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.requests().delete(request_id, user.id).await?;
    Ok(empty_success("Request deleted successfully").into_response())
}

/// `POST /api/requests/:id/approve` — re-checks the slot and
/// materializes the event atomically. On conflict the request stays
/// Pending and the response names the conflicting bookings.
pub async fn approve_request(
    State(state): State<AppState>,
    OsasUser(_user): OsasUser,
    Path(request_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.requests().approvals().approve(request_id).await?;
    Ok(success(
        EventView::of(event),
        "Event request approved successfully",
    )
    .into_response())
}

/// `POST /api/requests/:id/reject`
pub async fn reject_request(
    State(state): State<AppState>,
    OsasUser(_user): OsasUser,
    Path(request_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.requests().approvals().reject(request_id).await?;
    Ok(empty_success("Event request rejected").into_response())
}
