use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Role;
use crate::utils::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

pub fn create_token(
    user_id: Uuid,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let expiration = (Utc::now() + Duration::hours(ttl_hours)).timestamp();

    let claims = Claims {
        sub: user_id,
        role,
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::InternalServerError(format!("token creation failed: {e}")))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthError("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let id = Uuid::new_v4();
        let token = create_token(id, Role::Student, "secret", 1).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Role::Student);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(Uuid::new_v4(), Role::Osas, "secret", 1).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_token(Uuid::new_v4(), Role::Department, "secret", -1).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
