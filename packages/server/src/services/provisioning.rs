//! Multi-entity writes that must land together or not at all.
//!
//! Each flow opens one transaction, runs the services against it and hands the result to
//! [`finish`], which commits on success and rolls back otherwise.

use common::{ProfileType, UserRole};
use sea_orm::DatabaseConnection;

use crate::entity::{player_profile, profile, user};
use crate::error::AppError;
use crate::utils::hash::HashCost;

use super::credentials::{CredentialStore, NewUser, UserChanges};
use super::profiles::{
    CoachDetails, CoachWithCategories, NewProfile, PlayerDetails, ProfileLinkage,
};
use super::{begin, finish};

pub struct Registration {
    pub user: user::Model,
    pub profile: profile::Model,
    pub player: player_profile::Model,
}

pub struct CoachAccount {
    pub user: user::Model,
    pub profile: profile::Model,
    pub coach: CoachWithCategories,
}

/// Self-service sign-up: an inactive PLAYER account.
pub async fn register(
    db: &DatabaseConnection,
    cost: HashCost,
    username: String,
    password: String,
) -> Result<user::Model, AppError> {
    let txn = begin(db).await?;
    let result = CredentialStore::new(&txn, cost)
        .create_user(NewUser {
            username,
            password,
            role: UserRole::Player,
            is_active: false,
        })
        .await;
    finish(txn, result).await
}

/// Sign-up that also creates the PLAYER profile and its details.
pub async fn register_complete(
    db: &DatabaseConnection,
    cost: HashCost,
    username: String,
    password: String,
    details: PlayerDetails,
) -> Result<Registration, AppError> {
    let txn = begin(db).await?;
    let result = async {
        let user = CredentialStore::new(&txn, cost)
            .create_user(NewUser {
                username,
                password,
                role: UserRole::Player,
                is_active: false,
            })
            .await?;

        let linkage = ProfileLinkage::new(&txn);
        let profile = linkage
            .create_profile(NewProfile {
                user_id: user.id,
                profile_type: ProfileType::Player,
                category_id: None,
                coach_profile_id: None,
                provisioning: None,
            })
            .await?;
        let player = linkage.create_player_profile(profile.id, details).await?;

        Ok(Registration {
            user,
            profile,
            player,
        })
    }
    .await;
    finish(txn, result).await
}

/// Admin flow: COACH user, COACH profile and coach details with categories.
pub async fn provision_coach(
    db: &DatabaseConnection,
    cost: HashCost,
    account: NewUser,
    details: CoachDetails,
    category_ids: Vec<i32>,
) -> Result<CoachAccount, AppError> {
    let txn = begin(db).await?;
    let result = async {
        let user = CredentialStore::new(&txn, cost)
            .create_user(NewUser {
                role: UserRole::Coach,
                ..account
            })
            .await?;

        let linkage = ProfileLinkage::new(&txn);
        let profile = linkage
            .create_profile(NewProfile {
                user_id: user.id,
                profile_type: ProfileType::Coach,
                category_id: None,
                coach_profile_id: None,
                provisioning: None,
            })
            .await?;
        let coach = linkage
            .create_coach_profile(profile.id, details, &category_ids)
            .await?;

        Ok(CoachAccount {
            user,
            profile,
            coach,
        })
    }
    .await;
    finish(txn, result).await
}

/// Admin user creation. Runs in a transaction so the MASTER guard's lock is scoped to it.
pub async fn create_user(
    db: &DatabaseConnection,
    cost: HashCost,
    new: NewUser,
    actor_role: UserRole,
) -> Result<user::Model, AppError> {
    let txn = begin(db).await?;
    let result = CredentialStore::new(&txn, cost)
        .create_user_as(new, actor_role)
        .await;
    finish(txn, result).await
}

pub async fn update_user(
    db: &DatabaseConnection,
    cost: HashCost,
    id: i32,
    changes: UserChanges,
    actor_role: UserRole,
) -> Result<user::Model, AppError> {
    let txn = begin(db).await?;
    let result = CredentialStore::new(&txn, cost)
        .update_user(id, changes, actor_role)
        .await;
    finish(txn, result).await
}

/// Delete a user with every profile, role-detail and category association it owns.
pub async fn delete_user(db: &DatabaseConnection, cost: HashCost, id: i32) -> Result<(), AppError> {
    let txn = begin(db).await?;
    let result = CredentialStore::new(&txn, cost).delete_user(id).await;
    finish(txn, result).await
}
