use axum::{extract::FromRequestParts, http::request::Parts};

use crate::entity::user;
use crate::error::AppError;
use crate::services::capabilities::{Capabilities, resolve_capabilities};
use crate::state::AppState;
use crate::utils::jwt;

/// Caller authenticated by the `Authorization: Bearer <token>` header.
///
/// Only the token is checked; use [`Identity`] when the handler needs the account
/// or its capabilities.
pub struct AuthUser {
    pub user_id: i32,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;
        let user_id = claims.user_id().map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser { user_id })
    }
}

/// Authenticated caller with its account and resolved capabilities.
///
/// Tokens of deleted or deactivated accounts are rejected here.
pub struct Identity {
    pub user: user::Model,
    pub caps: Capabilities,
}

impl Identity {
    pub fn user_id(&self) -> i32 {
        self.user.id
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.caps.require_admin()
    }

    pub fn require_admin_or_coach(&self) -> Result<(), AppError> {
        self.caps.require_admin_or_coach()
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser { user_id } = AuthUser::from_request_parts(parts, state).await?;

        let (user, caps) = match resolve_capabilities(&state.db, user_id).await {
            Ok(resolved) => resolved,
            Err(AppError::NotFound(_)) => {
                tracing::debug!(user_id, "Token subject no longer exists");
                return Err(AppError::TokenInvalid);
            }
            Err(e) => return Err(e),
        };
        if !user.is_active {
            tracing::debug!(user_id, "Token subject is inactive");
            return Err(AppError::TokenInvalid);
        }

        Ok(Identity { user, caps })
    }
}
