use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::auth::Identity;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, page_bounds};
use crate::models::user::{
    CreateUserRequest, UpdateUserRequest, UserListQuery, UserListResponse, UserResponse,
    validate_create_user,
};
use crate::services::credentials::{CredentialStore, DetailFilter, NewUser, UserQuery};
use crate::services::provisioning;
use crate::state::AppState;
use crate::utils::hash::HashCost;

#[instrument(skip(state, identity, payload), fields(username = %payload.username, role = %payload.role))]
pub async fn create_user(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    validate_create_user(&payload)?;

    let user = provisioning::create_user(
        &state.db,
        HashCost::from(&state.config.auth),
        NewUser {
            username: payload.username.trim().to_string(),
            password: payload.password,
            role: payload.role,
            is_active: payload.is_active,
        },
        identity.user.role,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[instrument(skip(state, identity, query))]
pub async fn list_users(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    identity.require_admin()?;
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let (users, total) = CredentialStore::new(&state.db, HashCost::from(&state.config.auth))
        .list(UserQuery {
            page,
            per_page,
            search: query.search,
            role: query.role,
            details: DetailFilter {
                document: query.document,
                first_name: query.first_name,
                last_name: query.last_name,
            },
        })
        .await?;

    Ok(Json(UserListResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Admins may read any user, everyone else only themselves.
#[instrument(skip(state, identity), fields(id))]
pub async fn get_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    if identity.user_id() != id {
        identity.require_admin()?;
    }

    let user = CredentialStore::new(&state.db, HashCost::from(&state.config.auth))
        .find_user(id)
        .await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, identity, payload), fields(id))]
pub async fn update_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    identity.require_admin()?;
    let changes = payload.into_changes()?;

    let user = provisioning::update_user(
        &state.db,
        HashCost::from(&state.config.auth),
        id,
        changes,
        identity.user.role,
    )
    .await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, identity), fields(id))]
pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;

    provisioning::delete_user(&state.db, HashCost::from(&state.config.auth), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
