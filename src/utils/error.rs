use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::scheduling::conflict::ConflictItem;
use crate::scheduling::ScheduleError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Schedule overlap detected; carries the conflicting commitments.
    #[error("Schedule conflict: {message}")]
    Conflict {
        message: String,
        conflicts: Vec<ConflictItem>,
    },

    /// A lifecycle transition was attempted from an illegal state
    /// (already processed, already cancelled, already completed).
    #[error("State error: {0}")]
    StateError(String),

    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Email delivery error: {0}")]
    EmailError(String),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl AppError {
    /// Builds a `Conflict` error naming the conflicting items, the way the
    /// approval and submission paths report them.
    pub fn schedule_conflict(conflicts: Vec<ConflictItem>) -> Self {
        let names: Vec<&str> = conflicts.iter().map(|c| c.name.as_str()).collect();
        AppError::Conflict {
            message: format!("Schedule conflict detected with: {}", names.join(", ")),
            conflicts,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::StateError(_) => StatusCode::CONFLICT,
            AppError::MalformedSchedule(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::EmailError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict { .. } => "SCHEDULE_CONFLICT",
            AppError::StateError(_) => "STATE_ERROR",
            AppError::MalformedSchedule(_) => "MALFORMED_SCHEDULE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::EmailError(_) => "EMAIL_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
            AppError::EmailError(msg) => {
                error!(message = %msg, "Email delivery error");
            }
            other => {
                error!(error = ?other, "Application error");
            }
        }
    }
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        AppError::MalformedSchedule(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::InternalServerError(format!("password hashing failed: {e}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client
        let (public_message, details) = match &self {
            AppError::DatabaseError(_) => ("A database error occurred".to_string(), None),
            AppError::EmailError(_) => ("Failed to send email".to_string(), None),
            AppError::Conflict { message, conflicts } => (
                message.clone(),
                serde_json::to_value(conflicts).ok(),
            ),
            other => (other.public_message(), None),
        };

        error_response(code, public_message, details, status)
    }
}

impl AppError {
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::StateError(msg)
            | AppError::MalformedSchedule(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::Conflict { message, .. } => message.clone(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::EmailError(_) => "Failed to send email".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::conflict::ConflictOrigin;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::StateError("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::MalformedSchedule("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_schedule_conflict_names_all_items() {
        let err = AppError::schedule_conflict(vec![
            ConflictItem {
                origin: ConflictOrigin::ApprovedEvent,
                name: "Sports Fest".into(),
                time: "03:00 PM - 05:00 PM".into(),
            },
            ConflictItem {
                origin: ConflictOrigin::PendingRequest,
                name: "Orientation".into(),
                time: "04:00 PM - 06:00 PM".into(),
            },
        ]);
        let AppError::Conflict { message, conflicts } = &err else {
            panic!("expected conflict");
        };
        assert!(message.contains("Sports Fest"));
        assert!(message.contains("Orientation"));
        assert_eq!(conflicts.len(), 2);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
