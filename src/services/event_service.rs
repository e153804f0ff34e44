use serde::Serialize;
use uuid::Uuid;

use crate::db::events::{EventRepo, NewEvent};
use crate::db::requests::RequestRepo;
use crate::db::requirements::RequirementRepo;
use crate::models::event::{Event, EventStatus};
use crate::scheduling::conflict::{detect_conflicts, Commitment, ConflictItem};
use crate::scheduling::status::{DisplayStatus, DisplayStatusCounts};
use crate::scheduling::Slot;
use crate::utils::error::AppError;
use crate::utils::time::campus_now;

/// An event together with its read-time status.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub display_status: DisplayStatus,
}

impl EventView {
    pub fn of(event: Event) -> Self {
        let display_status = event.display_status(campus_now());
        Self {
            event,
            display_status,
        }
    }
}

/// A requirement attached to a directly-created event.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RequirementSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Event lifecycle operations shared by departments and the oversight
/// office.
#[derive(Debug, Clone)]
pub struct EventService {
    events: EventRepo,
    requests: RequestRepo,
    requirements: RequirementRepo,
}

impl EventService {
    pub fn new(events: EventRepo, requests: RequestRepo, requirements: RequirementRepo) -> Self {
        Self {
            events,
            requests,
            requirements,
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<Event, AppError> {
        self.events
            .find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// Ownership gate: departments may only manage their own events;
    /// the oversight office may manage any.
    pub async fn find_managed(
        &self,
        id: Uuid,
        actor_id: Uuid,
        is_oversight: bool,
    ) -> Result<Event, AppError> {
        let event = self.find(id).await?;
        if !is_oversight && event.organizer_id != actor_id {
            return Err(AppError::Forbidden(
                "You can only manage events from your own department".to_string(),
            ));
        }
        Ok(event)
    }

    /// Conflicts the given slot would collide with, against Active
    /// events and Pending requests alike.
    pub async fn conflicts_for(
        &self,
        slot: &Slot,
        exclude: Option<Uuid>,
    ) -> Result<Vec<ConflictItem>, AppError> {
        let events = self.events.active_at(&slot.location, slot.date).await?;
        let requests = self.requests.pending_at(&slot.location, slot.date).await?;

        let mut commitments: Vec<Commitment> =
            events.iter().map(Commitment::from_event).collect();
        commitments.extend(requests.iter().map(Commitment::from_request));

        Ok(detect_conflicts(slot, &commitments, exclude))
    }

    async fn ensure_slot_free(&self, slot: &Slot, exclude: Option<Uuid>) -> Result<(), AppError> {
        let conflicts = self.conflicts_for(slot, exclude).await?;
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(AppError::schedule_conflict(conflicts))
        }
    }

    /// Directly creates an Active event (the oversight office's own
    /// events skip the request queue). Seat-limited events may carry
    /// requirements.
    pub async fn create_direct(
        &self,
        new: NewEvent,
        requirements: Vec<RequirementSpec>,
    ) -> Result<Event, AppError> {
        let slot = Slot::new(new.location.clone(), new.date, new.start_time, new.end_time)?;
        self.ensure_slot_free(&slot, None).await?;

        let event = self.events.insert(&new).await?;

        if event.participant_limit.is_some() {
            for spec in &requirements {
                self.requirements
                    .insert(event.id, &spec.name, spec.description.as_deref())
                    .await?;
            }
        }

        Ok(event)
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        actor_id: Uuid,
        is_oversight: bool,
    ) -> Result<(), AppError> {
        let event = self.find_managed(id, actor_id, is_oversight).await?;
        event.status.ensure_cancellable()?;
        self.events.cancel(id).await
    }

    /// Moves an Active event to a new date/time after re-checking the
    /// new slot with the event itself excluded.
    pub async fn postpone(
        &self,
        id: Uuid,
        actor_id: Uuid,
        is_oversight: bool,
        slot_date: chrono::NaiveDate,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
    ) -> Result<Event, AppError> {
        let event = self.find_managed(id, actor_id, is_oversight).await?;
        event.status.ensure_postponable()?;

        let slot = Slot::new(event.location.clone(), slot_date, start_time, end_time)?;
        self.ensure_slot_free(&slot, Some(event.id)).await?;

        self.events
            .set_schedule(id, slot_date, start_time, end_time)
            .await?;
        self.find(id).await
    }

    pub async fn list(&self, organizer: Option<Uuid>) -> Result<Vec<EventView>, AppError> {
        let events = self.events.list(organizer).await?;
        Ok(events.into_iter().map(EventView::of).collect())
    }

    pub async fn list_active(&self, organizer: Option<Uuid>) -> Result<Vec<EventView>, AppError> {
        let events = self.events.list_active(organizer).await?;
        Ok(events.into_iter().map(EventView::of).collect())
    }

    /// Reconciliation sweep: persists `Completed` for Active rows whose
    /// schedule has passed. Best-effort cache write-back, safe to run
    /// repeatedly; the derived status is authoritative either way.
    pub async fn sweep_completed(&self) -> Result<u64, AppError> {
        let now = campus_now();
        let mut updated = 0u64;
        for event in self.events.list_active(None).await? {
            if event.display_status(now) == DisplayStatus::Completed
                && self.events.complete_if_active(event.id).await?
            {
                updated += 1;
            }
        }
        if updated > 0 {
            tracing::debug!(updated, "marked past events completed");
        }
        Ok(updated)
    }

    /// Stored-status tallies (oversight dashboard).
    pub async fn status_counts(
        &self,
        organizer: Option<Uuid>,
    ) -> Result<EventStatusCounts, AppError> {
        let statuses = self.events.statuses(organizer).await?;
        Ok(EventStatusCounts::tally(statuses))
    }

    /// Display-status tallies (department dashboard).
    pub async fn display_status_counts(
        &self,
        organizer: Option<Uuid>,
    ) -> Result<DisplayStatusCounts, AppError> {
        let events = self.events.list(organizer).await?;
        Ok(DisplayStatusCounts::tally(events.iter(), campus_now()))
    }
}

/// Stored-status counters.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EventStatusCounts {
    pub active: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl EventStatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = EventStatus>) -> Self {
        let mut counts = Self::default();
        for status in statuses {
            match status {
                EventStatus::Active => counts.active += 1,
                EventStatus::Completed => counts.completed += 1,
                EventStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_tally() {
        let counts = EventStatusCounts::tally([
            EventStatus::Active,
            EventStatus::Active,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ]);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.cancelled, 1);
    }
}
