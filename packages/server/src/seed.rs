use common::UserRole;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{profile, user};
use crate::error::AppError;
use crate::services::credentials::NewUser;
use crate::services::provisioning;
use crate::utils::hash::HashCost;

/// Ensure indexes that schema-sync cannot express.
///
/// The `(user_id, profile_type)` pair is what makes a second profile of the same
/// type lose the race on insert, so failing to create it aborts startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("uq_profile_user_type")
        .table(profile::Entity)
        .col(profile::Column::UserId)
        .col(profile::Column::ProfileType)
        .to_string(PostgresQueryBuilder);
    db.execute_unprepared(&stmt).await?;
    info!("Ensured index uq_profile_user_type exists");

    // Lookup of players assigned to a coach, used when a coach profile is removed.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_profile_coach_profile")
        .table(profile::Entity)
        .col(profile::Column::CoachProfileId)
        .to_string(PostgresQueryBuilder);
    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_profile_coach_profile exists"),
        Err(e) => tracing::warn!("Failed to create index idx_profile_coach_profile: {}", e),
    }

    Ok(())
}

/// Create the MASTER account from `bootstrap.*` if configured and none exists yet.
pub async fn seed_master_account(db: &DatabaseConnection, config: &AppConfig) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (
        config.bootstrap.master_username.as_deref(),
        config.bootstrap.master_password.as_deref(),
    ) else {
        return Ok(());
    };

    let existing = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Master))
        .one(db)
        .await?;
    if let Some(master) = existing {
        info!(username = %master.username, "MASTER account already present");
        return Ok(());
    }

    let created = provisioning::create_user(
        db,
        HashCost::from(&config.auth),
        NewUser {
            username: username.trim().to_string(),
            password: password.to_string(),
            role: UserRole::Master,
            is_active: true,
        },
        // Bootstrap acts with master authority.
        UserRole::Master,
    )
    .await;

    match created {
        Ok(master) => {
            info!(user_id = master.id, username = %master.username, "Seeded MASTER account");
            Ok(())
        }
        // Another instance seeded concurrently.
        Err(AppError::Conflict(_)) => Ok(()),
        Err(AppError::UsernameTaken) => {
            tracing::warn!(
                "Cannot seed MASTER account: username '{}' belongs to another user",
                username
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}
