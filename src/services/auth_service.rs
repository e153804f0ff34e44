use rand::Rng;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::db::otps::OtpRepo;
use crate::db::users::UserRepo;
use crate::models::otp::OtpPurpose;
use crate::models::user::User;
use crate::utils::email::{Mailer, SendOutcome};
use crate::utils::error::AppError;
use crate::utils::jwt;

/// Result of an operation that dispatched an OTP. When no mail provider
/// is configured the code is handed back so development setups can
/// complete the flow.
#[derive(Debug, Clone, Serialize)]
pub struct OtpDispatch {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_otp: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserRepo,
    otps: OtpRepo,
    mailer: Arc<Mailer>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: UserRepo, otps: OtpRepo, mailer: Arc<Mailer>, config: Arc<Config>) -> Self {
        Self {
            users,
            otps,
            mailer,
            config,
        }
    }

    /// Creates a student account (unverified) and dispatches the email
    /// verification OTP.
    pub async fn signup(
        &self,
        full_name: &str,
        student_number: &str,
        email: &str,
        password: &str,
    ) -> Result<OtpDispatch, AppError> {
        validate_institutional_email(email, &self.config.email_domain)?;
        validate_password_policy(password)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::ValidationError(
                "Email already registered. Please log in instead".to_string(),
            ));
        }
        if self.users.student_number_taken(student_number).await? {
            return Err(AppError::ValidationError(
                "Student ID already registered".to_string(),
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user = self
            .users
            .insert_student(full_name, email, &password_hash, student_number)
            .await?;

        self.dispatch_otp(OtpPurpose::Verification, &user.email, &user.full_name)
            .await
    }

    /// Re-sends a verification code for an account that has not
    /// verified yet.
    pub async fn resend_verification(&self, email: &str) -> Result<OtpDispatch, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account for this email".to_string()))?;
        if user.email_verified {
            return Err(AppError::ValidationError(
                "Email already verified".to_string(),
            ));
        }
        self.dispatch_otp(OtpPurpose::Verification, &user.email, &user.full_name)
            .await
    }

    pub async fn verify_email(&self, email: &str, otp: &str) -> Result<(), AppError> {
        self.otps
            .verify_and_consume(OtpPurpose::Verification, email, otp)
            .await?;
        self.users.mark_email_verified(email).await
    }

    /// Verifies credentials and returns a bearer token plus the account.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, User), AppError> {
        let invalid = || AppError::AuthError("Invalid email or password".to_string());

        let user = self.users.find_by_email(email).await?.ok_or_else(invalid)?;

        if !bcrypt::verify(password, &user.password_hash)? {
            return Err(invalid());
        }
        if !user.email_verified {
            return Err(AppError::AuthError(
                "Please verify your email first".to_string(),
            ));
        }

        let token = jwt::create_token(
            user.id,
            user.role,
            &self.config.jwt_secret,
            self.config.token_ttl_hours,
        )?;
        Ok((token, user))
    }

    /// Starts a password reset. Whether the account exists is never
    /// revealed; unknown addresses get no OTP but the same response.
    pub async fn forgot_password(&self, email: &str) -> Result<Option<OtpDispatch>, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(None);
        };
        let dispatch = self
            .dispatch_otp(OtpPurpose::Reset, &user.email, &user.full_name)
            .await?;
        Ok(Some(dispatch))
    }

    /// Completes a password reset: redeems the OTP and installs the new
    /// password under the same policy as signup.
    pub async fn reset_password(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        validate_password_policy(new_password)?;
        self.otps
            .verify_and_consume(OtpPurpose::Reset, email, otp)
            .await?;
        let password_hash = bcrypt::hash(new_password, bcrypt::DEFAULT_COST)?;
        self.users.update_password(email, &password_hash).await
    }

    pub async fn current_user(&self, user_id: uuid::Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::AuthError("User not found".to_string()))
    }

    async fn dispatch_otp(
        &self,
        purpose: OtpPurpose,
        email: &str,
        full_name: &str,
    ) -> Result<OtpDispatch, AppError> {
        let otp = generate_otp();
        let expires_at =
            chrono::Utc::now() + chrono::Duration::minutes(self.config.otp_ttl_minutes);
        self.otps.replace(purpose, email, &otp, expires_at).await?;

        let outcome = match purpose {
            OtpPurpose::Verification => {
                self.mailer
                    .send_verification_otp(email, full_name, &otp, self.config.otp_ttl_minutes)
                    .await?
            }
            OtpPurpose::Reset => {
                self.mailer
                    .send_password_reset_otp(email, full_name, &otp, self.config.otp_ttl_minutes)
                    .await?
            }
        };

        Ok(OtpDispatch {
            email: email.to_string(),
            dev_otp: match outcome {
                SendOutcome::Sent => None,
                SendOutcome::NotConfigured => Some(otp),
            },
        })
    }
}

/// Six random digits.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    (0..6).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}

/// Institutional address: `firstname.lastname@<domain>`, letters only
/// around the dot.
pub fn validate_institutional_email(email: &str, domain: &str) -> Result<(), AppError> {
    let invalid = || {
        AppError::ValidationError(format!(
            "Please use your institutional email (firstname.lastname@{domain})"
        ))
    };

    let local = email
        .strip_suffix(&format!("@{domain}"))
        .ok_or_else(invalid)?;
    let (first, last) = local.split_once('.').ok_or_else(invalid)?;
    let alphabetic = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic());
    if alphabetic(first) && alphabetic(last) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// At least 8 characters with an uppercase letter, a lowercase letter
/// and a digit.
pub fn validate_password_policy(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::ValidationError(
            "Password must be at least 8 characters long".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::ValidationError(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::ValidationError(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "Password must contain at least one number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..32 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_institutional_email_validation() {
        let domain = "lspu.edu.ph";
        assert!(validate_institutional_email("juan.delacruz@lspu.edu.ph", domain).is_ok());
        assert!(validate_institutional_email("juan@lspu.edu.ph", domain).is_err());
        assert!(validate_institutional_email("juan.delacruz@gmail.com", domain).is_err());
        assert!(validate_institutional_email("juan.cruz2@lspu.edu.ph", domain).is_err());
        assert!(validate_institutional_email(".cruz@lspu.edu.ph", domain).is_err());
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password_policy("Passw0rd").is_ok());
        assert!(validate_password_policy("short1A").is_err());
        assert!(validate_password_policy("alllowercase1").is_err());
        assert!(validate_password_policy("ALLUPPERCASE1").is_err());
        assert!(validate_password_policy("NoDigitsHere").is_err());
    }
}
