use uuid::Uuid;

use crate::db::events::EventRepo;
use crate::db::registrations::RegistrationRepo;
use crate::db::requirements::RequirementRepo;
use crate::models::requirement::{FulfillmentWithRequirement, Requirement};
use crate::utils::error::AppError;

/// Requirement checklists on seat-limited events: departments define
/// them, students mark submissions, departments verify.
#[derive(Debug, Clone)]
pub struct RequirementService {
    events: EventRepo,
    registrations: RegistrationRepo,
    requirements: RequirementRepo,
}

impl RequirementService {
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

    pub async fn add(
        &self,
        department_id: Uuid,
        event_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> Result<Requirement, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Requirement name is required".to_string(),
            ));
        }
        self.ensure_event_owned(department_id, event_id).await?;
        self.requirements.insert(event_id, name, description).await
    }

    pub async fn list_for_event(&self, event_id: Uuid) -> Result<Vec<Requirement>, AppError> {
        self.requirements.list_by_event(event_id).await
    }

    pub async fn delete(
        &self,
        department_id: Uuid,
        requirement_id: Uuid,
    ) -> Result<(), AppError> {
        let requirement = self
            .requirements
            .find(requirement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Requirement not found".to_string()))?;
        self.ensure_event_owned(department_id, requirement.event_id)
            .await?;
        self.requirements.delete(requirement_id).await?;
        Ok(())
    }

    /// Student's checklist for one of their registrations.
    pub async fn checklist(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Vec<FulfillmentWithRequirement>, AppError> {
        self.registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        self.requirements
            .fulfillments_for_registration(registration_id)
            .await
    }

    /// Student marks one of their requirements as submitted.
    pub async fn mark_submitted(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
        requirement_id: Uuid,
    ) -> Result<(), AppError> {
        let registration = self
            .registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        let requirement = self
            .requirements
            .find(requirement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Requirement not found".to_string()))?;
        if requirement.event_id != registration.event_id {
            return Err(AppError::ValidationError(
                "Requirement does not belong to this event".to_string(),
            ));
        }

        self.requirements
            .mark_submitted(registration_id, requirement_id)
            .await
    }

    /// Department verifies (or unverifies) a fulfillment on its own
    /// event.
    pub async fn set_verified(
        &self,
        department_id: Uuid,
        registration_id: Uuid,
        requirement_id: Uuid,
        verified: bool,
    ) -> Result<(), AppError> {
        let registration = self
            .registrations
            .find(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        self.ensure_event_owned(department_id, registration.event_id)
            .await?;
        self.requirements
            .set_verified(registration_id, requirement_id, verified)
            .await
    }

    /// Department view of a registration's checklist plus the
    /// all-verified flag.
    pub async fn review(
        &self,
        department_id: Uuid,
        registration_id: Uuid,
    ) -> Result<(Vec<FulfillmentWithRequirement>, bool), AppError> {
        let registration = self
            .registrations
            .find(registration_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        self.ensure_event_owned(department_id, registration.event_id)
            .await?;

        let fulfillments = self
            .requirements
            .fulfillments_for_registration(registration_id)
            .await?;
        let all_verified = self.requirements.all_verified(registration_id).await?;
        Ok((fulfillments, all_verified))
    }

    async fn ensure_event_owned(
        &self,
        department_id: Uuid,
        event_id: Uuid,
    ) -> Result<(), AppError> {
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
        Ok(())
    }
}
