use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::user::Role;
use crate::utils::error::AppError;
use crate::utils::jwt;

/// The authenticated caller, decoded from the bearer token. Role gating
/// happens once here instead of being re-derived in every handler.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Access denied. {} accounts only",
                match role {
                    Role::Student => "Student",
                    Role::Department => "Department",
                    Role::Osas => "OSAS",
                }
            )))
        }
    }

    pub fn is_oversight(&self) -> bool {
        self.role == Role::Osas
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::AuthError("Expected a bearer token".to_string()))?;

        let claims = jwt::decode_token(token, &state.config.jwt_secret)?;
        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

macro_rules! role_extractor {
    ($name:ident, $role:expr) => {
        /// Role-gated variant of [`AuthUser`].
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub AuthUser);

        #[async_trait]
        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                user.require_role($role)?;
                Ok($name(user))
            }
        }
    };
}

role_extractor!(StudentUser, Role::Student);
role_extractor!(DepartmentUser, Role::Department);
role_extractor!(OsasUser, Role::Osas);

/// An event organizer: a department or the oversight office.
#[derive(Debug, Clone, Copy)]
pub struct OrganizerUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for OrganizerUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Department | Role::Osas => Ok(OrganizerUser(user)),
            Role::Student => Err(AppError::Forbidden(
                "Access denied. Organizer accounts only".to_string(),
            )),
        }
    }
}
