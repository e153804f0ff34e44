use serde::Serialize;
use uuid::Uuid;

use crate::db::events::EventRepo;
use crate::db::registrations::RegistrationRepo;
use crate::models::registration::{RegistrationStatus, RegistrationWithStudent};
use crate::scheduling::status::DisplayStatus;
use crate::utils::error::AppError;
use crate::utils::time::campus_now;

use super::event_service::EventView;

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub event: EventView,
    pub registrations: Vec<RegistrationWithStudent>,
    pub total_approved: usize,
    pub total_attended: usize,
    /// Percentage of approved registrants who checked in, one decimal.
    pub attendance_rate: f64,
}

/// QR check-in and attendance reporting.
#[derive(Debug, Clone)]
pub struct AttendanceService {
    events: EventRepo,
    registrations: RegistrationRepo,
}

impl AttendanceService {
    pub fn new(events: EventRepo, registrations: RegistrationRepo) -> Self {
        Self {
            events,
            registrations,
        }
    }

    /// Events an organizer may scan for right now: only those whose
    /// display status is Ongoing.
    pub async fn scannable_events(&self, organizer_id: Uuid) -> Result<Vec<EventView>, AppError> {
        let now = campus_now();
        let events = self.events.list_active(Some(organizer_id)).await?;
        Ok(events
            .into_iter()
            .filter(|e| e.display_status(now) == DisplayStatus::Ongoing)
            .map(EventView::of)
            .collect())
    }

    /// Verifies a scanned code and marks attendance. The code is an
    /// opaque token checked by straight equality, scoped to the event.
    pub async fn check_in(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
        unique_code: Uuid,
    ) -> Result<RegistrationWithStudent, AppError> {
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.organizer_id != organizer_id {
            return Err(AppError::Forbidden(
                "This event does not belong to you".to_string(),
            ));
        }

        let registration = self
            .registrations
            .find_by_code(event_id, unique_code)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("Invalid QR code or event mismatch".to_string())
            })?;

        if registration.status != RegistrationStatus::Approved {
            return Err(AppError::ValidationError(
                "Registration not approved".to_string(),
            ));
        }

        if registration.attended {
            return Err(AppError::StateError(format!(
                "{} has already checked in",
                registration.full_name
            )));
        }

        self.registrations.mark_attended(registration.id).await?;
        tracing::info!(
            registration = %registration.id,
            event = %event_id,
            "attendance marked"
        );

        self.registrations
            .find_by_code(event_id, unique_code)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Registration disappeared".to_string()))
    }

    pub async fn report(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
    ) -> Result<AttendanceReport, AppError> {
        let event = self
            .events
            .find(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        if event.organizer_id != organizer_id {
            return Err(AppError::Forbidden(
                "This event does not belong to your department".to_string(),
            ));
        }

        let registrations = self.registrations.list_approved_by_event(event_id).await?;
        let total_approved = registrations.len();
        let total_attended = registrations.iter().filter(|r| r.attended).count();

        Ok(AttendanceReport {
            event: EventView::of(event),
            registrations,
            total_approved,
            total_attended,
            attendance_rate: attendance_rate(total_attended, total_approved),
        })
    }
}

fn attendance_rate(attended: usize, approved: usize) -> f64 {
    if approved == 0 {
        return 0.0;
    }
    (attended as f64 / approved as f64 * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_rate() {
        assert_eq!(attendance_rate(0, 0), 0.0);
        assert_eq!(attendance_rate(1, 3), 33.3);
        assert_eq!(attendance_rate(3, 3), 100.0);
    }
}
