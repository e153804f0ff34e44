use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account role. Students browse and register, departments organize their
/// own events, the oversight office (OSAS) approves requests and can
/// manage any event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Department,
    Osas,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Department => "department",
            Role::Osas => "osas",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub student_number: Option<String>,
    pub department_name: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name of this account when it organizes events: the
    /// oversight office shows as "OSAS", departments by their name.
    pub fn organizer_name(&self) -> String {
        match self.role {
            Role::Osas => "OSAS".to_string(),
            _ => self
                .department_name
                .clone()
                .unwrap_or_else(|| self.full_name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(role: Role, department_name: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Jamie Cruz".to_string(),
            email: "jamie.cruz@lspu.edu.ph".to_string(),
            password_hash: "hash".to_string(),
            role,
            student_number: None,
            department_name: department_name.map(str::to_string),
            email_verified: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_organizer_name() {
        assert_eq!(make_user(Role::Osas, None).organizer_name(), "OSAS");
        assert_eq!(
            make_user(Role::Department, Some("College of Engineering")).organizer_name(),
            "College of Engineering"
        );
        assert_eq!(
            make_user(Role::Department, None).organizer_name(),
            "Jamie Cruz"
        );
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(make_user(Role::Student, None)).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
