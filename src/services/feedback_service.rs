use serde::Serialize;
use uuid::Uuid;

use crate::db::events::EventRepo;
use crate::db::registrations::RegistrationRepo;
use crate::db::feedback::FeedbackRepo;
use crate::models::feedback::{Feedback, FeedbackSummary, FeedbackWithEvent, FeedbackWithStudent};
use crate::scheduling::status::DisplayStatus;
use crate::utils::error::AppError;
use crate::utils::time::campus_now;

#[derive(Debug, Clone, Serialize)]
pub struct EventFeedbackView {
    pub summary: FeedbackSummary,
    pub feedback: Vec<FeedbackWithStudent>,
}

/// Post-event feedback collection.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    events: EventRepo,
    registrations: RegistrationRepo,
    feedback: FeedbackRepo,
}

impl FeedbackService {
    pub fn new(
        events: EventRepo,
        registrations: RegistrationRepo,
        feedback: FeedbackRepo,
    ) -> Self {
        Self {
            events,
            registrations,
            feedback,
        }
    }

    /// Submits or revises feedback for a completed event. Free-for-all
    /// events accept feedback from any registrant; seat-limited events
    /// only from students who actually attended.
    pub async fn submit(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Feedback, AppError> {
        if !(1..=5).contains(&rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let registration = self
            .registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;

        let event = self
            .events
            .find(registration.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.display_status(campus_now()) != DisplayStatus::Completed {
            return Err(AppError::ValidationError(
                "You can only submit feedback for completed events".to_string(),
            ));
        }

        if !can_give_feedback(event.is_free_for_all(), registration.attended) {
            return Err(AppError::Forbidden(
                "You can only submit feedback for events you attended".to_string(),
            ));
        }

        let comment = comment.filter(|c| !c.trim().is_empty());
        match self.feedback.find_by_registration(registration_id).await? {
            Some(_) => {
                self.feedback
                    .update(registration_id, rating, comment.as_deref())
                    .await
            }
            None => {
                self.feedback
                    .insert(
                        registration_id,
                        event.id,
                        student_id,
                        rating,
                        comment.as_deref(),
                    )
                    .await
            }
        }
    }

    pub async fn find_own(
        &self,
        student_id: Uuid,
        registration_id: Uuid,
    ) -> Result<Option<Feedback>, AppError> {
        self.registrations
            .find_owned(registration_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))?;
        self.feedback.find_by_registration(registration_id).await
    }

    /// Organizer's view of an event's feedback, with summary stats.
    pub async fn for_event(
        &self,
        organizer_id: Uuid,
        event_id: Uuid,
    ) -> Result<EventFeedbackView, AppError> {
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

        let ratings = self.feedback.ratings_for_event(event_id).await?;
        let feedback = self.feedback.list_by_event(event_id).await?;
        Ok(EventFeedbackView {
            summary: FeedbackSummary::from_ratings(&ratings),
            feedback,
        })
    }

    pub async fn history(&self, student_id: Uuid) -> Result<Vec<FeedbackWithEvent>, AppError> {
        self.feedback.list_by_student(student_id).await
    }
}

/// Who may leave feedback: any registrant for free-for-all events,
/// attendees only for seat-limited ones.
pub fn can_give_feedback(free_for_all: bool, attended: bool) -> bool {
    free_for_all || attended
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_eligibility() {
        assert!(can_give_feedback(true, false));
        assert!(can_give_feedback(true, true));
        assert!(can_give_feedback(false, true));
        assert!(!can_give_feedback(false, false));
    }
}
