use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::events::NewEvent;
use crate::db::users::UserRepo;
use crate::handlers::extract::{OrganizerUser, OsasUser, StudentUser};
use crate::models::event::Event;
use crate::models::registration::RegistrationCounts;
use crate::models::requirement::Requirement;
use crate::scheduling::status::DisplayStatus;
use crate::scheduling::{parse_date, parse_flexible_time};
use crate::services::event_service::{EventView, RequirementSpec};
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};
use crate::utils::time::campus_now;

/// Event fields common to creation payloads, with textual date/times.
#[derive(Deserialize)]
pub struct EventPayload {
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
    pub requirements: Vec<RequirementSpec>,
}

impl EventPayload {
    pub fn validate_required(&self) -> Result<(), AppError> {
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
        Ok(())
    }
}

/// `POST /api/events` — the oversight office creates an event directly;
/// it goes Active without passing through the request queue.
pub async fn create_event(
    State(state): State<AppState>,
    OsasUser(user): OsasUser,
    Json(payload): Json<EventPayload>,
) -> Result<Response, AppError> {
    payload.validate_required()?;

    let new = NewEvent {
        organizer_id: user.id,
        event_request_id: None,
        event_name: payload.event_name.trim().to_string(),
        description: payload.description.clone(),
        location: payload.location.trim().to_string(),
        date: parse_date(&payload.date)?,
        start_time: parse_flexible_time(&payload.start_time)?,
        end_time: parse_flexible_time(&payload.end_time)?,
        participant_limit: payload.participant_limit,
    };

    let event = state
        .events()
        .create_direct(new, payload.requirements)
        .await?;
    Ok(created(EventView::of(event), "Event created successfully").into_response())
}

/// What a browsing student sees for each upcoming event.
#[derive(Serialize)]
struct BrowseEvent {
    #[serde(flatten)]
    event: Event,
    display_status: DisplayStatus,
    organizer_name: String,
    has_registered: bool,
    is_free_for_all: bool,
    available_seats: Option<i64>,
    is_full: bool,
    requirements: Vec<Requirement>,
}

/// `GET /api/events` — Active and Ongoing events for students; events
/// already past are reconciled and filtered out.
pub async fn browse_events(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
) -> Result<Response, AppError> {
    let events = state.events();
    let registrations = state.registrations();
    let requirements = state.requirements();
    let users = UserRepo::new(state.db.clone());

    // Opportunistic write-back before the listing
    events.sweep_completed().await?;

    let mut listing = Vec::new();
    for view in events.list_active(None).await? {
        if view.display_status == DisplayStatus::Completed {
            continue;
        }

        let event = view.event;
        let has_registered = registrations.has_registered(user.id, event.id).await?;
        let available_seats = registrations.available_seats(&event).await?;
        let is_free_for_all = event.is_free_for_all();
        let reqs = if is_free_for_all {
            Vec::new()
        } else {
            requirements.list_for_event(event.id).await?
        };
        let organizer_name = users
            .find_by_id(event.organizer_id)
            .await?
            .map(|u| u.organizer_name())
            .unwrap_or_default();

        listing.push(BrowseEvent {
            display_status: view.display_status,
            organizer_name,
            has_registered,
            is_free_for_all,
            is_full: available_seats == Some(0),
            available_seats,
            requirements: reqs,
            event,
        });
    }

    Ok(success(listing, "Active events").into_response())
}

/// `GET /api/events/:id`
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events().find(event_id).await?;
    Ok(success(EventView::of(event), "Event details").into_response())
}

#[derive(Serialize)]
struct ManagedEvent {
    #[serde(flatten)]
    view: EventView,
    registration_counts: RegistrationCounts,
    total_registrations: i64,
}

/// `GET /api/manage/events` — an organizer's events with registration
/// tallies. Departments see their own; the oversight office sees all.
pub async fn manage_events(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
) -> Result<Response, AppError> {
    let events = state.events();
    let registrations = state.registrations();

    events.sweep_completed().await?;

    let organizer = if user.is_oversight() {
        None
    } else {
        Some(user.id)
    };

    let mut listing = Vec::new();
    for view in events.list(organizer).await? {
        let counts = registrations.event_counts(view.event.id).await?;
        listing.push(ManagedEvent {
            view,
            registration_counts: counts,
            total_registrations: counts.total(),
        });
    }

    Ok(success(listing, "Events").into_response())
}

/// `POST /api/events/:id/cancel` — departments cancel their own events,
/// the oversight office can cancel any.
pub async fn cancel_event(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state
        .events()
        .cancel(event_id, user.id, user.is_oversight())
        .await?;
    Ok(empty_success("Event cancelled successfully").into_response())
}

#[derive(Deserialize)]
pub struct PostponePayload {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// `POST /api/events/:id/postpone` — reschedules an Active event after
/// re-checking the new slot.
pub async fn postpone_event(
    State(state): State<AppState>,
    OrganizerUser(user): OrganizerUser,
    Path(event_id): Path<Uuid>,
    Json(payload): Json<PostponePayload>,
) -> Result<Response, AppError> {
    let event = state
        .events()
        .postpone(
            event_id,
            user.id,
            user.is_oversight(),
            parse_date(&payload.date)?,
            parse_flexible_time(&payload.start_time)?,
            parse_flexible_time(&payload.end_time)?,
        )
        .await?;
    Ok(success(EventView::of(event), "Event postponed successfully").into_response())
}

#[derive(Serialize)]
struct HistoryEntry {
    registration_id: Uuid,
    event_id: Uuid,
    event_name: String,
    location: String,
    date: chrono::NaiveDate,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
    is_free_for_all: bool,
    attended: bool,
    can_give_feedback: bool,
    has_feedback: bool,
}

/// `GET /api/events/history` — completed events the student registered
/// for, with feedback eligibility.
pub async fn event_history(
    State(state): State<AppState>,
    StudentUser(user): StudentUser,
) -> Result<Response, AppError> {
    use crate::scheduling::status::derive_display_status;
    use crate::services::feedback_service::can_give_feedback;

    state.events().sweep_completed().await?;

    let feedback = state.feedback();
    let now = campus_now();

    let mut entries = Vec::new();
    for reg in state.registrations().list_own(user.id, None).await? {
        let display = derive_display_status(
            reg.event_status,
            reg.date,
            reg.start_time,
            reg.end_time,
            now,
        );
        if display != DisplayStatus::Completed {
            continue;
        }

        let is_free_for_all = reg.participant_limit.is_none();
        let has_feedback = feedback.find_own(user.id, reg.id).await?.is_some();

        entries.push(HistoryEntry {
            registration_id: reg.id,
            event_id: reg.event_id,
            event_name: reg.event_name,
            location: reg.location,
            date: reg.date,
            start_time: reg.start_time,
            end_time: reg.end_time,
            is_free_for_all,
            attended: reg.attended,
            can_give_feedback: can_give_feedback(is_free_for_all, reg.attended),
            has_feedback,
        });
    }

    // Most recent first
    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(success(entries, "Event history").into_response())
}
