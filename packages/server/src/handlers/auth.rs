use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::auth::Identity;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MeResponse, RegisterCompleteRequest, RegisterCompleteResponse,
    RegisterRequest, VerifyResponse, validate_login_request, validate_register_request,
};
use crate::models::user::UserResponse;
use crate::services::credentials::CredentialStore;
use crate::services::provisioning;
use crate::state::AppState;
use crate::utils::hash::HashCost;
use crate::utils::jwt;

/// Self-service registration. Always creates an inactive PLAYER.
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let user = provisioning::register(
        &state.db,
        HashCost::from(&state.config.auth),
        payload.username.trim().to_string(),
        payload.password,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Registration with player details, created atomically.
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register_complete(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterCompleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (username, password, details) = payload.into_parts()?;

    let registration = provisioning::register_complete(
        &state.db,
        HashCost::from(&state.config.auth),
        username,
        password,
        details,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterCompleteResponse {
            user: registration.user.into(),
            profile: registration.profile.into(),
            player_profile: registration.player.into(),
        }),
    ))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let user = CredentialStore::new(&state.db, HashCost::from(&state.config.auth))
        .validate_credentials(payload.username.trim(), &payload.password)
        .await?;

    let token = jwt::sign(user.id, &state.config.auth)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        user: user.into(),
        token,
    }))
}

/// Succeeds only for a valid token of an existing, active account.
#[instrument(skip(identity), fields(user_id = identity.user_id()))]
pub async fn verify(identity: Identity) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user_id: identity.user_id(),
    })
}

#[instrument(skip(identity), fields(user_id = identity.user_id()))]
pub async fn me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        user: identity.user.into(),
        capabilities: identity.caps,
    })
}
