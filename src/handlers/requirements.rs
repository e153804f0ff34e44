use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::handlers::extract::{DepartmentUser, StudentUser};
use crate::models::requirement::FulfillmentWithRequirement;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Deserialize)]
pub struct AddRequirementPayload {
    pub requirement_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `POST /api/events/:id/requirements`
pub async fn add_requirement(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<AddRequirementPayload>,
) -> Result<Response, AppError> {
    let requirement = state
        .requirements()
        .add(
            user.id,
            event_id,
            payload.requirement_name.trim(),
            payload.description.as_deref(),
        )
        .await?;
    Ok(created(requirement, "Requirement added").into_response())
}

/// `GET /api/events/:id/requirements`
pub async fn list_requirements(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let requirements = state.requirements().list_for_event(event_id).await?;
    Ok(success(requirements, "Event requirements").into_response())
}

/// `DELETE /api/requirements/:id`
pub async fn delete_requirement(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(requirement_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.requirements().delete(user.id, requirement_id).await?;
    Ok(empty_success("Requirement deleted").into_response())
}

/// `GET /api/registrations/:id/requirements` — the student's own
/// checklist.
pub async fn my_checklist(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let checklist = state
        .requirements()
        .checklist(user.id, registration_id)
        .await?;
    Ok(success(checklist, "Requirement checklist").into_response())
}

/// `POST /api/registrations/:id/requirements/:req_id/submit`
pub async fn mark_submitted(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path((registration_id, requirement_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    state
        .requirements()
        .mark_submitted(user.id, registration_id, requirement_id)
        .await?;
    Ok(empty_success("Requirement marked as submitted").into_response())
}

#[derive(Deserialize)]
pub struct VerifyPayload {
    pub verified: bool,
}

/// `POST /api/registrations/:id/requirements/:req_id/verify`
pub async fn set_verified(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path((registration_id, requirement_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<VerifyPayload>,
) -> Result<Response, AppError> {
    state
        .requirements()
        .set_verified(user.id, registration_id, requirement_id, payload.verified)
        .await?;
    let message = if payload.verified {
        "Requirement verified"
    } else {
        "Requirement verification removed"
    };
    Ok(empty_success(message).into_response())
}

#[derive(Serialize)]
struct RequirementReview {
    fulfillments: Vec<FulfillmentWithRequirement>,
    all_verified: bool,
}

/// `GET /api/registrations/:id/requirements/review` — department view
/// of a registrant's checklist.
pub async fn review_checklist(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (fulfillments, all_verified) = state
        .requirements()
        .review(user.id, registration_id)
        .await?;
    Ok(success(
        RequirementReview {
            fulfillments,
            all_verified,
        },
        "Requirement review",
    )
    .into_response())
}
