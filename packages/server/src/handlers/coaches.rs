use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::instrument;

use crate::error::AppError;
use crate::extractors::auth::Identity;
use crate::extractors::json::AppJson;
use crate::models::coach::{CoachAccountResponse, CreateCoachRequest};
use crate::services::provisioning;
use crate::state::AppState;
use crate::utils::hash::HashCost;

/// Create a coach user together with its COACH profile and coach details.
#[instrument(skip(state, identity, payload), fields(username = %payload.username))]
pub async fn create_coach(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCoachRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    let (account, details, category_ids) = payload.into_parts()?;

    let created = provisioning::provision_coach(
        &state.db,
        HashCost::from(&state.config.auth),
        account,
        details,
        category_ids,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CoachAccountResponse {
            user: created.user.into(),
            profile: created.profile.into(),
            coach_profile: created.coach.into(),
        }),
    ))
}
