use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What an OTP is for. Each purpose has its own table so a verification
/// code can never be replayed as a reset code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    Verification,
    Reset,
}

impl OtpPurpose {
    pub fn table(&self) -> &'static str {
        match self {
            OtpPurpose::Verification => "email_verifications",
            OtpPurpose::Reset => "password_resets",
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OtpRecord {
    pub id: Uuid,
    pub email: String,
    pub otp: String,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
    pub created_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Checks whether this record can still be redeemed at `now`.
    pub fn check_redeemable(&self, now: DateTime<Utc>) -> Result<(), OtpRejection> {
        if self.consumed {
            return Err(OtpRejection::AlreadyUsed);
        }
        if now > self.expires_at {
            return Err(OtpRejection::Expired);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpRejection {
    AlreadyUsed,
    Expired,
}

impl OtpRejection {
    pub fn message(&self) -> &'static str {
        match self {
            OtpRejection::AlreadyUsed => "OTP has already been used",
            OtpRejection::Expired => "OTP has expired. Please request a new one",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(consumed: bool, expires_in_minutes: i64) -> OtpRecord {
        OtpRecord {
            id: Uuid::new_v4(),
            email: "a.b@lspu.edu.ph".to_string(),
            otp: "123456".to_string(),
            expires_at: Utc::now() + Duration::minutes(expires_in_minutes),
            consumed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_redeemable_fresh_code() {
        assert!(record(false, 10).check_redeemable(Utc::now()).is_ok());
    }

    #[test]
    fn test_rejects_consumed_code() {
        assert_eq!(
            record(true, 10).check_redeemable(Utc::now()),
            Err(OtpRejection::AlreadyUsed)
        );
    }

    #[test]
    fn test_rejects_expired_code() {
        assert_eq!(
            record(false, -1).check_redeemable(Utc::now()),
            Err(OtpRejection::Expired)
        );
    }
}
