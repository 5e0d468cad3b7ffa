//! User Model

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User role (角色)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserRole {
    Admin,
    Kitchen,
    Server,
    #[default]
    Staff,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Kitchen => "kitchen",
            UserRole::Server => "server",
            UserRole::Staff => "staff",
        }
    }

    /// 可被分配为桌台服务员的角色
    pub fn can_serve_tables(&self) -> bool {
        matches!(self, UserRole::Server | UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "kitchen" => Ok(UserRole::Kitchen),
            "server" => Ok(UserRole::Server),
            "staff" => Ok(UserRole::Staff),
            other => Err(AppError::with_message(
                ErrorCode::InvalidRole,
                "Invalid role. Must be one of: admin, kitchen, server, staff",
            )
            .with_detail("role", other)),
        }
    }
}

/// User entity (用户), never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: i64,
}

/// User row including the password hash, for login only
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCredentials {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
    pub created_at: i64,
}

impl From<UserCredentials> for User {
    fn from(row: UserCredentials) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

/// Register payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register / login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
    pub token: String,
}

/// Update user payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("kitchen".parse::<UserRole>().unwrap(), UserRole::Kitchen);
        let err = "chef".parse::<UserRole>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRole);
    }

    #[test]
    fn test_user_serialize_has_no_hash() {
        let creds = UserCredentials {
            id: 1,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            role: UserRole::Admin,
            password_hash: "$argon2id$...".into(),
            created_at: 0,
        };
        let json = serde_json::to_value(User::from(creds)).unwrap();
        assert_eq!(json["role"], "admin");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_can_serve_tables() {
        assert!(UserRole::Server.can_serve_tables());
        assert!(UserRole::Admin.can_serve_tables());
        assert!(!UserRole::Kitchen.can_serve_tables());
    }
}
