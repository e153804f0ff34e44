use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;
use crate::utils::error::AppError;

/// Whether a message actually went out. When SMTP is not configured the
/// caller may fall back to surfacing the OTP directly (development mode),
/// mirroring how the deployment behaves without a mail provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    NotConfigured,
}

/// SMTP mailer for OTP delivery.
#[derive(Clone)]
pub struct Mailer {
    smtp_host: Option<String>,
    credentials: Credentials,
    from: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            smtp_host: config.smtp_host.clone(),
            credentials: Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ),
            from: config.smtp_from.clone(),
        }
    }

    pub async fn send_verification_otp(
        &self,
        to: &str,
        full_name: &str,
        otp: &str,
        ttl_minutes: i64,
    ) -> Result<SendOutcome, AppError> {
        let html = otp_body(
            "Welcome to Campus Events",
            &format!(
                "Hello <strong>{full_name}</strong>, use this code to verify \
                 your institutional email:"
            ),
            otp,
            ttl_minutes,
        );
        self.send(to, "Verify Your Email - OTP Code", html).await
    }

    pub async fn send_password_reset_otp(
        &self,
        to: &str,
        full_name: &str,
        otp: &str,
        ttl_minutes: i64,
    ) -> Result<SendOutcome, AppError> {
        let html = otp_body(
            "Password Reset Request",
            &format!(
                "Hello <strong>{full_name}</strong>, use this code to reset \
                 your password. If you didn't request this, ignore this email."
            ),
            otp,
            ttl_minutes,
        );
        self.send(to, "Password Reset Request - OTP Code", html)
            .await
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: String,
    ) -> Result<SendOutcome, AppError> {
        let Some(host) = &self.smtp_host else {
            tracing::warn!(to, subject, "SMTP not configured, email not sent");
            return Ok(SendOutcome::NotConfigured);
        };

        let email = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| AppError::EmailError(format!("Invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::EmailError(format!("Invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::EmailError(format!("Failed to build email: {e}")))?;

        let mailer = SmtpTransport::relay(host)
            .map_err(|e| AppError::EmailError(format!("SMTP relay error: {e}")))?
            .credentials(self.credentials.clone())
            .build();

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| AppError::EmailError(format!("Failed to send email: {e}")))
        })
        .await
        .map_err(|e| AppError::EmailError(format!("Email task failed: {e}")))??;

        Ok(SendOutcome::Sent)
    }
}

fn otp_body(title: &str, greeting: &str, otp: &str, ttl_minutes: i64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>{title}</h2>
    <p>{greeting}</p>
    <div style="border: 2px solid #e5e7eb; border-radius: 8px; padding: 20px; text-align: center;">
      <div style="font-size: 32px; font-weight: bold; letter-spacing: 8px;">{otp}</div>
      <p style="color: #6b7280; font-size: 14px;">This code expires in {ttl_minutes} minutes</p>
    </div>
    <p style="color: #666; font-size: 12px; margin-top: 40px;">Campus Event and Student Management</p>
  </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_body_contains_code_and_ttl() {
        let body = otp_body("Title", "Hello", "123456", 10);
        assert!(body.contains("123456"));
        assert!(body.contains("expires in 10 minutes"));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_reports_not_configured() {
        let mailer = Mailer {
            smtp_host: None,
            credentials: Credentials::new(String::new(), String::new()),
            from: "Campus Events <noreply@example.edu>".to_string(),
        };
        let outcome = mailer
            .send_verification_otp("a.b@example.edu", "A B", "123456", 10)
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::NotConfigured);
    }
}
