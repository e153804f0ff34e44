use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::handlers::extract::{DepartmentUser, StudentUser};
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct FeedbackPayload {
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

/// `POST /api/registrations/:id/feedback` — submit or revise feedback
/// for a completed event.
pub async fn submit_feedback(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(registration_id): Path<Uuid>,
    Json(payload): Json<FeedbackPayload>,
) -> Result<Response, AppError> {
    let feedback = state
        .feedback()
        .submit(user.id, registration_id, payload.rating, payload.comment)
        .await?;
    Ok(success(feedback, "Thank you for your feedback").into_response())
}

/// `GET /api/registrations/:id/feedback` — the student's own feedback,
/// if any.
pub async fn my_feedback(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let feedback = state.feedback().find_own(user.id, registration_id).await?;
    Ok(success(feedback, "Feedback").into_response())
}

/// `GET /api/events/:id/feedback` — organizer's view with summary
/// statistics.
pub async fn event_feedback(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let view = state.feedback().for_event(user.id, event_id).await?;
    Ok(success(view, "Event feedback").into_response())
}

/// `GET /api/feedback/history` — everything the student has submitted.
pub async fn feedback_history(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
) -> Result<Response, AppError> {
    let history = state.feedback().history(user.id).await?;
    Ok(success(history, "Feedback history").into_response())
}
