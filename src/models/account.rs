//! Account domain models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Persisted account record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,

    /// student | admin
    pub role: String,

    /// Inactive accounts may still verify their password but cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn role(&self) -> Role {
        Role::from(self.role.clone())
    }
}

/// Account role enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    /// Default role assigned at registration
    pub fn default_role() -> Self {
        Role::Student
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Role::Admin,
            _ => Role::Student,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => "student".to_string(),
            Role::Admin => "admin".to_string(),
        }
    }
}

/// Registration request
///
/// Fields default to empty strings so missing fields fail validation with the
/// regular error envelope instead of a body-deserialization rejection.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 3, max = 64, message = "Username must be between 3 and 64 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Please provide a valid email address"))]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "First name is required"))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "Last name is required"))]
    pub last_name: String,
}

/// Login request; `username` accepts a username or an email address
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Field set for account creation, handed to the directory
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Public profile returned by register/login and the CRUD endpoints.
/// Never includes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<Account> for AccountProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
        }
    }
}

/// Extended profile returned by `/api/auth/me`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetail {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountDetail {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            is_active: account.is_active,
            created_at: account.created_at,
        }
    }
}
