use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub profile_id: i32,
    #[sea_orm(belongs_to, from = "profile_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document: String,
    pub document_type: String,
    pub birth_date: Option<Date>,

    // Guardian contact
    pub family_name: Option<String>,
    pub family_contact: Option<String>,
    pub relationship: Option<String>,

    /// Roster activation, e.g. pending admin approval. Not the login gate.
    #[sea_orm(default_value = false)]
    pub is_active: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
