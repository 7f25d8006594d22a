#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account-level role stored on every user.
///
/// Ordering of importance for authorization checks is `Master > Admin > everything else`;
/// `Coach`, `Player` and `User` carry no implicit privileges on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// The single system owner. At most one may exist.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "MASTER"))]
    Master,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ADMIN"))]
    Admin,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "COACH"))]
    Coach,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PLAYER"))]
    Player,
    /// Generic account with no club role yet.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "USER"))]
    User,
}

impl UserRole {
    pub const ALL: &'static [UserRole] = &[
        Self::Master,
        Self::Admin,
        Self::Coach,
        Self::Player,
        Self::User,
    ];

    /// Authorization rank: lower is more important. Coach, player and user share the lowest rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Master => 0,
            Self::Admin => 1,
            Self::Coach | Self::Player | Self::User => 2,
        }
    }

    /// Returns true for roles that carry administrative privileges (admin or master).
    pub fn is_administrative(&self) -> bool {
        self.rank() <= Self::Admin.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::Admin => "ADMIN",
            Self::Coach => "COACH",
            Self::Player => "PLAYER",
            Self::User => "USER",
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid role '{}'. Valid values: {}",
            self.invalid,
            UserRole::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRoleError {
                invalid: s.to_string(),
            })
    }
}
