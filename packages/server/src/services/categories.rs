use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::category;
use crate::error::AppError;

use super::is_unique_violation;

/// Read side of the category catalogue used for reference validation, plus the
/// minimal write surface needed to populate it.
pub struct CategoryDirectory<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> CategoryDirectory<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find_one(&self, id: i32) -> Result<category::Model, AppError> {
        category::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    pub async fn list(&self) -> Result<Vec<category::Model>, AppError> {
        Ok(category::Entity::find()
            .order_by_asc(category::Column::Id)
            .all(self.conn)
            .await?)
    }

    /// Ids from `ids` that do not reference an existing category, in input order.
    pub async fn missing_ids(&self, ids: &[i32]) -> Result<Vec<i32>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<i32> = category::Entity::find()
            .filter(category::Column::Id.is_in(ids.to_vec()))
            .select_only()
            .column(category::Column::Id)
            .into_tuple()
            .all(self.conn)
            .await?;

        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// Batch existence check. Fails with one error naming every missing id.
    pub async fn require_all(&self, ids: &[i32]) -> Result<(), AppError> {
        let missing = self.missing_ids(ids).await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::not_found_many("Categories", &missing))
        }
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<category::Model, AppError> {
        let exists = category::Entity::find()
            .filter(category::Column::Name.eq(&name))
            .one(self.conn)
            .await?
            .is_some();
        if exists {
            return Err(AppError::Conflict(format!(
                "Category with name '{name}' already exists"
            )));
        }

        let model = category::ActiveModel {
            name: Set(name.clone()),
            description: Set(description),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Category with name '{name}' already exists"))
            } else {
                AppError::from(e)
            }
        })
    }
}
