use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Placeholder document type used when a coach profile is auto-provisioned.
pub const UNKNOWN_DOCUMENT_TYPE: &str = "N/A";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coach_profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub profile_id: i32,
    #[sea_orm(belongs_to, from = "profile_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: Option<String>,

    /// Categories this coach may train.
    #[sea_orm(has_many, via = "coach_profile_category")]
    pub categories: HasMany<super::category::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
