use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::handlers::extract::{DepartmentUser, StudentUser};
use crate::models::registration::{
    Registration, RegistrationCounts, RegistrationStatus, RegistrationWithEvent,
    RegistrationWithStudent,
};
use crate::services::registration_service::RegistrationOutcome;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
struct RegisterResponse {
    registration: Registration,
    outcome: RegistrationOutcome,
}

/// `POST /api/events/:id/register`
pub async fn register_for_event(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (registration, outcome) = state.registrations().register(user.id, event_id).await?;

    let message = match outcome {
        RegistrationOutcome::Confirmed => {
            "Registration successful. You're all set for this event"
        }
        RegistrationOutcome::AwaitingApproval => {
            "Registration submitted. Awaiting department approval"
        }
    };
    Ok(created(
        RegisterResponse {
            registration,
            outcome,
        },
        message,
    )
    .into_response())
}

#[derive(Deserialize)]
pub struct StatusFilter {
    #[serde(default)]
    pub status: Option<RegistrationStatus>,
}

#[derive(Serialize)]
struct MyRegistrations {
    registrations: Vec<RegistrationWithEvent>,
    counts: RegistrationCounts,
}

/// `GET /api/registrations` — the student's own registrations.
pub async fn my_registrations(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Query(filter): Query<StatusFilter>,
) -> Result<Response, AppError> {
    let service = state.registrations();
    let registrations = service.list_own(user.id, filter.status).await?;
    let counts = service.own_counts(user.id).await?;
    Ok(success(
        MyRegistrations {
            registrations,
            counts,
        },
        "Your registrations",
    )
    .into_response())
}

/// `GET /api/registrations/:id` — one of the student's registrations,
/// including the attendance code once approved (rendered client-side as
/// a QR image).
pub async fn my_registration(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let registration = state
        .registrations()
        .find_own(user.id, registration_id)
        .await?;
    Ok(success(registration, "Registration details").into_response())
}

/// `DELETE /api/registrations/:id` — withdraw while still Pending.
pub async fn cancel_registration(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state
        .registrations()
        .cancel_own(user.id, registration_id)
        .await?;
    Ok(empty_success("Registration cancelled").into_response())
}

/// `POST /api/registrations/:id/approve` — department approves and the
/// attendance code is issued.
pub async fn approve_registration(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let registration = state
        .registrations()
        .approve(user.id, registration_id)
        .await?;
    Ok(success(
        registration,
        "Registration approved successfully. QR code has been generated",
    )
    .into_response())
}

/// `POST /api/registrations/:id/reject`
pub async fn reject_registration(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let registration = state
        .registrations()
        .reject(user.id, registration_id)
        .await?;
    Ok(success(registration, "Registration rejected").into_response())
}

#[derive(Serialize)]
struct EventRegistrations {
    registrations: Vec<RegistrationWithStudent>,
    counts: RegistrationCounts,
}

/// `GET /api/events/:id/registrations` — a department's view of who
/// signed up for its event.
pub async fn event_registrations(
    State(state): State<AppState>,
    DepartmentUser(user): DepartmentUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (registrations, counts) = state
        .registrations()
        .list_for_event(user.id, event_id)
        .await?;
    Ok(success(
        EventRegistrations {
            registrations,
            counts,
        },
        "Event registrations",
    )
    .into_response())
}
