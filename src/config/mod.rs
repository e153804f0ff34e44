use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

/// Server configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub otp_ttl_minutes: i64,
    /// Institutional mail domain enforced at signup (e.g. `lspu.edu.ph`).
    pub email_domain: String,
    pub smtp_host: Option<String>,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/campus_events".to_string()),
            database_max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5),
            port: parse_env("PORT", 3001),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-only-secret".to_string()),
            token_ttl_hours: parse_env("TOKEN_TTL_HOURS", 24),
            otp_ttl_minutes: parse_env("OTP_TTL_MINUTES", 10),
            email_domain: env::var("CAMPUS_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "lspu.edu.ph".to_string()),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            smtp_from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "Campus Events <noreply@lspu.edu.ph>".to_string()),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_on_missing() {
        env::remove_var("CAMPUS_TEST_MISSING_KEY");
        let value: u16 = parse_env("CAMPUS_TEST_MISSING_KEY", 42);
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_env_falls_back_on_garbage() {
        env::set_var("CAMPUS_TEST_GARBAGE_KEY", "not-a-number");
        let value: u32 = parse_env("CAMPUS_TEST_GARBAGE_KEY", 7);
        assert_eq!(value, 7);
        env::remove_var("CAMPUS_TEST_GARBAGE_KEY");
    }
}
