use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::events::EventRepo;
use crate::db::feedback::FeedbackRepo;
use crate::db::otps::OtpRepo;
use crate::db::registrations::RegistrationRepo;
use crate::db::requests::RequestRepo;
use crate::db::requirements::RequirementRepo;
use crate::db::users::UserRepo;
use crate::services::attendance_service::AttendanceService;
use crate::services::auth_service::AuthService;
use crate::services::event_service::EventService;
use crate::services::feedback_service::FeedbackService;
use crate::services::registration_service::RegistrationService;
use crate::services::request_service::RequestService;
use crate::services::requirement_service::RequirementService;
use crate::utils::email::Mailer;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub mailer: Arc<Mailer>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer = Arc::new(Mailer::from_config(&config));
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(
            UserRepo::new(self.db.clone()),
            OtpRepo::new(self.db.clone()),
            self.mailer.clone(),
            self.config.clone(),
        )
    }

    pub fn events(&self) -> EventService {
        EventService::new(
            EventRepo::new(self.db.clone()),
            RequestRepo::new(self.db.clone()),
            RequirementRepo::new(self.db.clone()),
        )
    }

    pub fn requests(&self) -> RequestService {
        RequestService::new(RequestRepo::new(self.db.clone()))
    }

    pub fn registrations(&self) -> RegistrationService {
        RegistrationService::new(
            EventRepo::new(self.db.clone()),
            RegistrationRepo::new(self.db.clone()),
            RequirementRepo::new(self.db.clone()),
        )
    }

    pub fn attendance(&self) -> AttendanceService {
        AttendanceService::new(
            EventRepo::new(self.db.clone()),
            RegistrationRepo::new(self.db.clone()),
        )
    }

    pub fn requirements(&self) -> RequirementService {
        RequirementService::new(
            EventRepo::new(self.db.clone()),
            RegistrationRepo::new(self.db.clone()),
            RequirementRepo::new(self.db.clone()),
        )
    }

    pub fn feedback(&self) -> FeedbackService {
        FeedbackService::new(
            EventRepo::new(self.db.clone()),
            RegistrationRepo::new(self.db.clone()),
            FeedbackRepo::new(self.db.clone()),
        )
    }
}
