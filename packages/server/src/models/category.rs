use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::category;
use crate::error::AppError;

use super::shared::{trimmed, validate_required};

#[derive(Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(), AppError> {
    validate_required("Name", &req.name)?;
    if let Some(ref d) = req.description
        && d.len() > 4096
    {
        return Err(AppError::Validation(
            "Description must be at most 4096 bytes".into(),
        ));
    }
    Ok(())
}

impl CreateCategoryRequest {
    pub fn normalized(self) -> (String, Option<String>) {
        (self.name.trim().to_string(), trimmed(self.description))
    }
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(m: category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            created_at: m.created_at,
        }
    }
}
