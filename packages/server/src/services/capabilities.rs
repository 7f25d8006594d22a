use common::UserRole;
use sea_orm::{ConnectionTrait, EntityTrait};
use serde::Serialize;

use crate::entity::user;
use crate::error::AppError;

use super::profiles::{LinkedProfile, ProfileDetail, ProfileLinkage};

/// Effective capabilities of a caller, derived from role and profile linkage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub is_master: bool,
    pub is_admin: bool,
    pub is_player: bool,
    pub is_coach: bool,
    pub player_profile_id: Option<i32>,
    pub coach_profile_id: Option<i32>,
}

impl Capabilities {
    /// Pure derivation. When a user holds several role-details of one kind the lowest
    /// profile id wins, so the result is stable for a given linkage state.
    pub fn derive(role: UserRole, linked: &[LinkedProfile]) -> Self {
        let mut caps = Capabilities {
            is_master: role == UserRole::Master,
            is_admin: role.is_administrative(),
            ..Default::default()
        };

        for detail in linked.iter().flat_map(|l| &l.details) {
            match detail {
                ProfileDetail::Player(player) => {
                    caps.is_player = true;
                    caps.player_profile_id.get_or_insert(player.id);
                }
                ProfileDetail::Coach(coach) => {
                    caps.is_coach = true;
                    caps.coach_profile_id.get_or_insert(coach.id);
                }
                ProfileDetail::None => {}
            }
        }

        caps
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn require_admin_or_coach(&self) -> Result<(), AppError> {
        if self.is_admin || self.is_coach {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// Load a user and derive its capabilities. Read-only.
pub async fn resolve_capabilities<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> Result<(user::Model, Capabilities), AppError> {
    let user = user::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("User", user_id))?;
    let linked = ProfileLinkage::new(conn).linked_profiles(user.id).await?;
    let caps = Capabilities::derive(user.role, &linked);
    Ok((user, caps))
}
