#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag of a role-scoped profile. A user holds at most one profile per type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PLAYER"))]
    Player,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COACH"))]
    Coach,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADMIN"))]
    Admin,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "OTHER"))]
    Other,
}

impl ProfileType {
    /// Profile types that may carry a coach role-detail regardless of the owner's role.
    pub fn admits_coach_detail(&self) -> bool {
        matches!(self, Self::Coach | Self::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "PLAYER",
            Self::Coach => "COACH",
            Self::Admin => "ADMIN",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for ProfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
