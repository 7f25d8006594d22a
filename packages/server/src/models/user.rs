use chrono::{DateTime, Utc};
use common::UserRole;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::services::credentials::UserChanges;

use super::shared::{Pagination, validate_password, validate_username};

/// Public view of a user. The password hash is never included.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            role: m.role,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    /// Defaults to `false`; accounts stay locked until activated.
    #[serde(default)]
    pub is_active: bool,
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;
    validate_password(&req.password)
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn into_changes(self) -> Result<UserChanges, AppError> {
        if let Some(ref username) = self.username {
            validate_username(username)?;
        }
        if let Some(ref password) = self.password {
            validate_password(password)?;
        }
        Ok(UserChanges {
            username: self.username.map(|u| u.trim().to_string()),
            password: self.password,
            role: self.role,
            is_active: self.is_active,
        })
    }
}

#[derive(Deserialize)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub role: Option<UserRole>,
    /// Document number on a player or coach profile.
    pub document: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub pagination: Pagination,
}
