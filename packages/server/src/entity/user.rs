use common::UserRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Case-sensitive, unique.
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id PHC string. Never plaintext.
    #[serde(skip_serializing)]
    pub password: String,

    pub role: UserRole,
    /// Login gate. Independent of `player_profile.is_active`.
    #[sea_orm(default_value = false)]
    pub is_active: bool,

    #[sea_orm(has_many)]
    pub profiles: HasMany<super::profile::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
