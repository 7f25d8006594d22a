use common::ProfileType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role-scoped extension of a user. `(user_id, profile_type)` is unique; the composite
/// index is created by `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub profile_type: ProfileType,

    pub category_id: Option<i32>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: Option<super::category::Entity>,

    /// Coach a player is assigned to. Kept as a plain column: `coach_profile` already
    /// references `profile`, and the back-reference is maintained by the linkage engine.
    pub coach_profile_id: Option<i32>,

    #[sea_orm(has_one)]
    pub player_profile: HasOne<super::player_profile::Entity>,

    #[sea_orm(has_one)]
    pub coach_profile: HasOne<super::coach_profile::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
