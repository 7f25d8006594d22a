use chrono::{DateTime, NaiveDate, Utc};
use common::ProfileType;
use serde::{Deserialize, Serialize};

use crate::entity::{coach_profile, player_profile, profile};
use crate::error::AppError;
use crate::services::profiles::{
    CoachDetails, CoachProfileChanges, CoachWithCategories, NewProfile, PlayerDetails,
    PlayerProfileChanges, ProfileChanges, Provisioning,
};

use super::shared::{
    double_option, parse_date, trimmed, validate_category_ids, validate_email, validate_optional,
    validate_required,
};

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Create a profile. The coach fields are only used when a coach profile is
/// provisioned automatically for administrators.
#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub user_id: i32,
    pub profile_type: ProfileType,
    pub category_id: Option<i32>,
    pub coach_profile_id: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    pub document: Option<String>,
    pub category_ids: Option<Vec<i32>>,
}

impl CreateProfileRequest {
    /// Blank provisioning fields count as absent, so the coach defaults apply.
    pub fn into_new_profile(self) -> Result<NewProfile, AppError> {
        let category_ids = self.category_ids.unwrap_or_default();
        validate_category_ids(&category_ids)?;

        Ok(NewProfile {
            user_id: self.user_id,
            profile_type: self.profile_type,
            category_id: self.category_id,
            coach_profile_id: self.coach_profile_id,
            provisioning: Some(Provisioning {
                first_name: trimmed(self.first_name),
                last_name: self.last_name.map(|v| v.trim().to_string()),
                document_type: trimmed(self.document_type),
                document: trimmed(self.document),
                category_ids,
            }),
        })
    }
}

#[derive(Deserialize)]
pub struct CreatePlayerProfileRequest {
    pub profile_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document: String,
    pub document_type: String,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    pub family_name: Option<String>,
    pub family_contact: Option<String>,
    pub relationship: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

impl CreatePlayerProfileRequest {
    pub fn into_details(self) -> Result<(i32, PlayerDetails), AppError> {
        validate_required("First name", &self.first_name)?;
        validate_required("Last name", &self.last_name)?;
        validate_email(&self.email)?;
        validate_required("Document", &self.document)?;
        validate_required("Document type", &self.document_type)?;
        let birth_date = trimmed(self.birth_date)
            .map(|d| parse_date("birth_date", &d))
            .transpose()?;

        Ok((
            self.profile_id,
            PlayerDetails {
                first_name: self.first_name.trim().to_string(),
                last_name: self.last_name.trim().to_string(),
                email: self.email.trim().to_string(),
                document: self.document.trim().to_string(),
                document_type: self.document_type.trim().to_string(),
                birth_date,
                family_name: trimmed(self.family_name),
                family_contact: trimmed(self.family_contact),
                relationship: trimmed(self.relationship),
                is_active: self.is_active,
            },
        ))
    }
}

#[derive(Deserialize)]
pub struct CreateCoachProfileRequest {
    pub profile_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: Option<String>,
    pub category_ids: Option<Vec<i32>>,
}

impl CreateCoachProfileRequest {
    pub fn into_details(self) -> Result<(i32, CoachDetails, Vec<i32>), AppError> {
        let (details, category_ids) = coach_details(
            self.first_name,
            self.last_name,
            self.document_type,
            self.document,
            self.category_ids,
        )?;
        Ok((self.profile_id, details, category_ids))
    }
}

/// Validate the coach fields shared by coach profile and coach account creation.
pub fn coach_details(
    first_name: String,
    last_name: String,
    document_type: String,
    document: Option<String>,
    category_ids: Option<Vec<i32>>,
) -> Result<(CoachDetails, Vec<i32>), AppError> {
    validate_required("First name", &first_name)?;
    validate_required("Last name", &last_name)?;
    validate_required("Document type", &document_type)?;
    let category_ids = category_ids.unwrap_or_default();
    validate_category_ids(&category_ids)?;

    Ok((
        CoachDetails {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            document_type: document_type.trim().to_string(),
            document: trimmed(document),
        },
        category_ids,
    ))
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub profile_type: Option<ProfileType>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub coach_profile_id: Option<Option<i32>>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            profile_type: req.profile_type,
            category_id: req.category_id,
            coach_profile_id: req.coach_profile_id,
        }
    }
}

#[derive(Deserialize)]
pub struct UpdatePlayerProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub family_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub family_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub relationship: Option<Option<String>>,
    pub is_active: Option<bool>,
}

impl UpdatePlayerProfileRequest {
    pub fn into_changes(self) -> Result<PlayerProfileChanges, AppError> {
        validate_optional("First name", self.first_name.as_deref())?;
        validate_optional("Last name", self.last_name.as_deref())?;
        validate_optional("Document", self.document.as_deref())?;
        validate_optional("Document type", self.document_type.as_deref())?;
        if let Some(ref email) = self.email {
            validate_email(email)?;
        }
        let birth_date: Option<Option<NaiveDate>> = match self.birth_date {
            Some(Some(d)) => Some(Some(parse_date("birth_date", &d)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(PlayerProfileChanges {
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_string()),
            document: self.document.map(|v| v.trim().to_string()),
            document_type: self.document_type.map(|v| v.trim().to_string()),
            birth_date,
            family_name: self.family_name.map(trimmed),
            family_contact: self.family_contact.map(trimmed),
            relationship: self.relationship.map(trimmed),
            is_active: self.is_active,
        })
    }
}

#[derive(Deserialize)]
pub struct UpdateCoachProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub document: Option<Option<String>>,
    /// Absent keeps the set, `null` or `[]` clears it, a list replaces it.
    #[serde(default, deserialize_with = "double_option")]
    pub category_ids: Option<Option<Vec<i32>>>,
}

impl UpdateCoachProfileRequest {
    pub fn into_changes(self) -> Result<CoachProfileChanges, AppError> {
        validate_optional("First name", self.first_name.as_deref())?;
        validate_optional("Last name", self.last_name.as_deref())?;
        validate_optional("Document type", self.document_type.as_deref())?;
        let category_ids = self.category_ids.map(Option::unwrap_or_default);
        if let Some(ref ids) = category_ids {
            validate_category_ids(ids)?;
        }

        Ok(CoachProfileChanges {
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            document_type: self.document_type.map(|v| v.trim().to_string()),
            document: self.document.map(trimmed),
            category_ids,
        })
    }
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub user_id: i32,
    pub profile_type: ProfileType,
    pub category_id: Option<i32>,
    pub coach_profile_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(m: profile::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            profile_type: m.profile_type,
            category_id: m.category_id,
            coach_profile_id: m.coach_profile_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct PlayerProfileResponse {
    pub id: i32,
    pub profile_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document: String,
    pub document_type: String,
    pub birth_date: Option<NaiveDate>,
    pub family_name: Option<String>,
    pub family_contact: Option<String>,
    pub relationship: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<player_profile::Model> for PlayerProfileResponse {
    fn from(m: player_profile::Model) -> Self {
        Self {
            id: m.id,
            profile_id: m.profile_id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            document: m.document,
            document_type: m.document_type,
            birth_date: m.birth_date,
            family_name: m.family_name,
            family_contact: m.family_contact,
            relationship: m.relationship,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct CoachProfileResponse {
    pub id: i32,
    pub profile_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: Option<String>,
    pub category_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CoachProfileResponse {
    pub fn new(m: coach_profile::Model, category_ids: Vec<i32>) -> Self {
        Self {
            id: m.id,
            profile_id: m.profile_id,
            first_name: m.first_name,
            last_name: m.last_name,
            document_type: m.document_type,
            document: m.document,
            category_ids,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<CoachWithCategories> for CoachProfileResponse {
    fn from(c: CoachWithCategories) -> Self {
        Self::new(c.coach, c.category_ids)
    }
}

/// A profile with its role-details.
#[derive(Serialize)]
pub struct ProfileDetailsResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub player_profile: Option<PlayerProfileResponse>,
    pub coach_profile: Option<CoachProfileResponse>,
}
