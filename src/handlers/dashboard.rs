use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::app_state::AppState;
use crate::handlers::extract::AuthUser;
use crate::models::registration::RegistrationCounts;
use crate::models::user::Role;
use crate::scheduling::status::DisplayStatusCounts;
use crate::services::event_service::EventStatusCounts;
use crate::services::request_service::RequestStatusCounts;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Serialize)]
struct DepartmentDashboard {
    events: DisplayStatusCounts,
    requests: RequestStatusCounts,
    total_registrations: i64,
    pending_registrations: i64,
}

#[derive(Serialize)]
struct OversightDashboard {
    events: EventStatusCounts,
    requests: RequestStatusCounts,
}

#[derive(Serialize)]
struct StudentDashboard {
    registrations: RegistrationCounts,
}

/// `GET /api/dashboard` — role-appropriate summary counters.
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    match user.role {
        Role::Department => {
            let events = state.events();
            events.sweep_completed().await?;

            let registrations = state.registrations();
            let mut totals = RegistrationCounts::default();
            for view in events.list(Some(user.id)).await? {
                let counts = registrations.event_counts(view.event.id).await?;
                totals.pending += counts.pending;
                totals.approved += counts.approved;
                totals.rejected += counts.rejected;
            }

            let payload = DepartmentDashboard {
                events: events.display_status_counts(Some(user.id)).await?,
                requests: state.requests().status_counts(Some(user.id)).await?,
                total_registrations: totals.total(),
                pending_registrations: totals.pending,
            };
            Ok(success(payload, "Department dashboard").into_response())
        }
        Role::Osas => {
            let events = state.events();
            events.sweep_completed().await?;

            let payload = OversightDashboard {
                events: events.status_counts(None).await?,
                requests: state.requests().status_counts(None).await?,
            };
            Ok(success(payload, "OSAS dashboard").into_response())
        }
        Role::Student => {
            let payload = StudentDashboard {
                registrations: state.registrations().own_counts(user.id).await?,
            };
            Ok(success(payload, "Student dashboard").into_response())
        }
    }
}
