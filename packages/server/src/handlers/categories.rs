use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::auth::{AuthUser, Identity};
use crate::extractors::json::AppJson;
use crate::models::category::{CategoryResponse, CreateCategoryRequest, validate_create_category};
use crate::services::categories::CategoryDirectory;
use crate::state::AppState;

#[instrument(skip(state, identity, payload), fields(name = %payload.name))]
pub async fn create_category(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    validate_create_category(&payload)?;

    let (name, description) = payload.normalized();
    let category = CategoryDirectory::new(&state.db)
        .create(name, description)
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

#[instrument(skip(state, _auth_user))]
pub async fn list_categories(
    _auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = CategoryDirectory::new(&state.db).list().await?;
    Ok(Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_category(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CategoryResponse>, AppError> {
    let category = CategoryDirectory::new(&state.db).find_one(id).await?;
    Ok(Json(category.into()))
}
