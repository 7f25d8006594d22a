use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::services::credentials::NewUser;
use crate::services::profiles::CoachDetails;

use super::profile::{CoachProfileResponse, ProfileResponse, coach_details};
use super::shared::{validate_password, validate_username};
use super::user::UserResponse;

/// Create a coach account: user, COACH profile and coach details in one step.
#[derive(Deserialize)]
pub struct CreateCoachRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_active: bool,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: Option<String>,
    pub category_ids: Option<Vec<i32>>,
}

impl CreateCoachRequest {
    pub fn into_parts(self) -> Result<(NewUser, CoachDetails, Vec<i32>), AppError> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        let (details, category_ids) = coach_details(
            self.first_name,
            self.last_name,
            self.document_type,
            self.document,
            self.category_ids,
        )?;

        let account = NewUser {
            username: self.username.trim().to_string(),
            password: self.password,
            role: common::UserRole::Coach,
            is_active: self.is_active,
        };
        Ok((account, details, category_ids))
    }
}

#[derive(Serialize)]
pub struct CoachAccountResponse {
    pub user: UserResponse,
    pub profile: ProfileResponse,
    pub coach_profile: CoachProfileResponse,
}
