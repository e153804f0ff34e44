//! PostgreSQL repositories. Every repository is a thin `PgPool` wrapper
//! with runtime-checked queries, one per aggregate.

pub mod events;
pub mod feedback;
pub mod otps;
pub mod registrations;
pub mod requests;
pub mod requirements;
pub mod users;

use crate::utils::error::AppError;

/// Translates constraint violations raised by the slot-exclusion and
/// one-registration-per-event constraints into their domain errors; all
/// other database failures pass through unchanged.
pub(crate) fn map_constraint_err(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.constraint() {
            Some("events_no_slot_overlap") => {
                return AppError::Conflict {
                    message:
                        "Schedule conflict detected: the slot was booked by a concurrent approval"
                            .to_string(),
                    conflicts: Vec::new(),
                }
            }
            Some("registrations_one_per_event") => {
                return AppError::ValidationError(
                    "You have already registered for this event.".to_string(),
                )
            }
            _ => {}
        }
    }
    AppError::DatabaseError(e)
}
