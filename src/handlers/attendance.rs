use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::handlers::extract::OrganizerUser;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// `GET /api/attendance/scannable` — events the organizer may scan for
/// right now (display status Ongoing only).
pub async fn scannable_events(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
) -> Result<Response, AppError> {
    let events = state.attendance().scannable_events(user.id).await?;
    Ok(success(events, "Scannable events").into_response())
}

#[derive(Deserialize)]
pub struct CheckInPayload {
    pub event_id: Uuid,
    pub unique_code: Uuid,
}

/// `POST /api/attendance/check-in` — verifies a scanned code and marks
/// the student attended.
pub async fn check_in(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
    Json(payload): Json<CheckInPayload>,
) -> Result<Response, AppError> {
    let registration = state
        .attendance()
        .check_in(user.id, payload.event_id, payload.unique_code)
        .await?;
    Ok(success(registration, "Attendance marked successfully").into_response())
}

/// `GET /api/events/:id/attendance` — attendance report for an event.
pub async fn attendance_report(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = state.attendance().report(user.id, event_id).await?;
    Ok(success(report, "Attendance report").into_response())
}
