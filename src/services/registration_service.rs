use uuid::Uuid;

use crate::db::events::EventRepo;
use crate::db::registrations::RegistrationRepo;
use crate::db::requirements::RequirementRepo;
use crate::models::event::{Event, EventStatus};
use crate::models::registration::{
    Registration, RegistrationCounts, RegistrationStatus, RegistrationWithEvent,
    RegistrationWithStudent,
};
use crate::utils::error::AppError;

/// How a fresh registration landed: free-for-all events confirm on the
/// spot, seat-limited ones queue for department approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Confirmed,
    AwaitingApproval,
}

#[derive(Debug, Clone)]
pub struct RegistrationService {
    events: EventRepo,
    registrations: RegistrationRepo,
    requirements: RequirementRepo,
}

impl RegistrationService {
    pub fn new(
        events: EventRepo,
        registrations: RegistrationRepo,
        requirements: RequirementRepo,
    ) -> Self {
        Self {
            events,
            registrations,
            requirements,
        }
    }

    /// Remaining seats, `None` for free-for-all events.
    pub async fn available_seats(&self, event: &Event) -> Result<Option<i64>, AppError> {
        let Some(limit) = event.participant_limit else {
            return Ok(None);
        };
        let approved = self.registrations.approved_count(event.id).await?;
        Ok(Some((i64::from(limit) - approved).max(0)))
    }

    pub async fn has_registered(&self, student_id: Uuid, event_id: Uuid) -> Result<bool, AppError> {
        self.registrations.exists(event_id, student_id).await
    }

    /// Registers a student for an event. Free-for-all events
    /// auto-approve; seat-limited events require free seats and start a
    /// requirement checklist.
    pub async fn register(
        &self,
        student_id: Uuid,
        event_id: Uuid,
    ) -> Result<(Registration, RegistrationOutcome), AppError> {
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.status != EventStatus::Active {
            return Err(AppError::StateError(
                "This event is no longer accepting registrations".to_string(),
            ));
        }

        if self.registrations.exists(event_id, student_id).await? {
            return Err(AppError::ValidationError(
                "You have already registered for this event".to_string(),
            ));
        }

        let free_for_all = event.is_free_for_all();
        if !free_for_all {
            if let Some(0) = self.available_seats(&event).await? {
                return Err(AppError::ValidationError(
                    "This event is full. No more seats available".to_string(),
                ));
            }
        }

        let registration = self
            .registrations
            .insert(event_id, student_id, free_for_all)
            .await?;

        if !free_for_all {
            self.requirements
                .init_for_registration(registration.id, event_id)
                .await?;
        }

        let outcome = if free_for_all {
            RegistrationOutcome::Confirmed
        } else {
            RegistrationOutcome::AwaitingApproval
        };
        Ok((registration, outcome))
    }

    /// Department approves a pending registration, issuing the opaque
    /// attendance code rendered to the student as a QR.
    pub async fn approve(
        &self,
        department_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Registration, AppError> {
        let (registration, event) = self
            .find_for_department(department_id, registration_id)
            .await?;
        registration.status.ensure_pending()?;

        // Keep seat-limited events capped even at approval time
        if let Some(0) = self.available_seats(&event).await? {
            return Err(AppError::ValidationError(
                "No seats remaining for this event".to_string(),
            ));
        }

        self.registrations
            .approve(registration_id, Uuid::new_v4())
            .await
    }

    pub async fn reject(
        &self,
        department_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Registration, AppError> {
        let (registration, _event) = self
            .find_for_department(department_id, registration_id)
            .await?;
        registration.status.ensure_pending()?;
        self.registrations.reject(registration_id).await
    }

    /// Student withdraws a registration that is still Pending; the row
    /// is deleted outright.
    pub async fn cancel_own(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
    ) -> Result<(), AppError> {
        let registration = self
            .registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        if registration.status != RegistrationStatus::Pending {
            return Err(AppError::StateError(
                "Only pending registrations can be cancelled".to_string(),
            ));
        }

        self.registrations
            .delete_pending(registration_id, student_id)
            .await?;
        Ok(())
    }

    pub async fn list_own(
        &self,
        student_id: Uuid,
        status: Option<RegistrationStatus>,
    ) -> Result<Vec<RegistrationWithEvent>, AppError> {
        self.registrations.list_by_student(student_id, status).await
    }

    pub async fn own_counts(&self, student_id: Uuid) -> Result<RegistrationCounts, AppError> {
        let statuses = self.registrations.statuses_by_student(student_id).await?;
        Ok(RegistrationCounts::tally(statuses))
    }

    /// A student's registration with its attendance code, for QR
    /// display.
    pub async fn find_own(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Registration, AppError> {
        self.registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))
    }

    pub async fn list_for_event(
        &self,
        department_id: Uuid,
        event_id: Uuid,
    ) -> Result<(Vec<RegistrationWithStudent>, RegistrationCounts), AppError> {
        self.ensure_event_owned(department_id, event_id).await?;
        let registrations = self.registrations.list_by_event(event_id).await?;
        let counts =
            RegistrationCounts::tally(self.registrations.statuses_by_event(event_id).await?);
        Ok((registrations, counts))
    }

    pub async fn event_counts(&self, event_id: Uuid) -> Result<RegistrationCounts, AppError> {
        let statuses = self.registrations.statuses_by_event(event_id).await?;
        Ok(RegistrationCounts::tally(statuses))
    }

    async fn ensure_event_owned(
        &self,
        department_id: Uuid,
        event_id: Uuid,
    ) -> Result<Event, AppError> {
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.organizer_id != department_id {
            return Err(AppError::Forbidden(
                "This event does not belong to your department".to_string(),
            ));
        }
        Ok(event)
    }

    async fn find_for_department(
        &self,
        department_id: Uuid,
        registration_id: Uuid,
    ) -> Result<(Registration, Event), AppError> {
        let registration = self
            .registrations
            .find(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        let event = self
            .ensure_event_owned(department_id, registration.event_id)
            .await?;
        Ok((registration, event))
    }
}
