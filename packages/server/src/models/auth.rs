use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::capabilities::Capabilities;
use crate::services::profiles::PlayerDetails;

use super::profile::{PlayerProfileResponse, ProfileResponse};
use super::shared::{
    parse_date, trimmed, validate_email, validate_password, validate_required, validate_username,
};
use super::user::UserResponse;

/// Request body for self-service registration.
#[derive(Deserialize)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    pub username: String,
    /// Password (6-128 characters).
    pub password: String,
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)
}

/// Registration that also records the player's personal details.
#[derive(Deserialize)]
pub struct RegisterCompleteRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document_type: String,
    pub document: String,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
}

impl RegisterCompleteRequest {
    /// Validate and split into the account part and the player details.
    pub fn into_parts(self) -> Result<(String, String, PlayerDetails), AppError> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_required("First name", &self.first_name)?;
        validate_required("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_required("Document type", &self.document_type)?;
        validate_required("Document", &self.document)?;
        let birth_date = trimmed(self.birth_date)
            .map(|d| parse_date("birth_date", &d))
            .transpose()?;

        let details = PlayerDetails {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            document: self.document.trim().to_string(),
            document_type: self.document_type.trim().to_string(),
            birth_date,
            family_name: None,
            family_contact: None,
            relationship: None,
            is_active: false,
        };
        Ok((self.username.trim().to_string(), self.password, details))
    }
}

/// Request body for login.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

#[derive(Serialize)]
pub struct RegisterCompleteResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
    pub player_profile: PlayerProfileResponse,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: i32,
}

/// Current user with derived capability flags.
#[derive(Serialize)]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}
