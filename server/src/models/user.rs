use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type UserId = i64;

/// Account role. A user without a role is unprivileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    Organizer,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Organizer => "organizer",
            Role::User => "user",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Option<Role>,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// A user about to be inserted; `password` already holds the digest.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub phone_number: String,
}

/// Fields a user may change on their own record.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSnapshot {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserSnapshot {
    pub fn full(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            role: user.role,
            created_at: Some(user.created_at),
        }
    }

    pub fn contact(user: &User) -> Self {
        Self {
            created_at: None,
            ..Self::full(user)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Organizer).unwrap(), "\"organizer\"");
        let role: Option<Role> = serde_json::from_str("null").unwrap();
        assert_eq!(role, None);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }

    #[test]
    fn test_password_is_never_serialized() {
        let user = User {
            id: 1,
            name: "Ada".into(),
            email: "a@x.com".into(),
            password: "$argon2id$secret".into(),
            role: None,
            phone_number: "555".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], serde_json::Value::Null);
    }
}
