use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::ConnectionTrait;
use tracing::instrument;

use crate::entity::profile;
use crate::error::AppError;
use crate::extractors::auth::Identity;
use crate::extractors::json::AppJson;
use crate::models::profile::{
    CoachProfileResponse, CreateCoachProfileRequest, CreatePlayerProfileRequest,
    CreateProfileRequest, PlayerProfileResponse, ProfileDetailsResponse, ProfileResponse,
    UpdateCoachProfileRequest, UpdatePlayerProfileRequest, UpdateProfileRequest,
};
use crate::services::profiles::{LinkedProfile, ProfileDetail, ProfileLinkage};
use crate::services::{begin, finish};
use crate::state::AppState;

#[instrument(skip(state, identity, payload), fields(user_id = payload.user_id, profile_type = %payload.profile_type))]
pub async fn create_profile(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    let new = payload.into_new_profile()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn).create_profile(new).await;
    let profile = finish(txn, result).await?;

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(profile))))
}

#[instrument(skip(state, identity, payload), fields(profile_id = payload.profile_id))]
pub async fn create_player_profile(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePlayerProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    let (profile_id, details) = payload.into_details()?;

    let player = ProfileLinkage::new(&state.db)
        .create_player_profile(profile_id, details)
        .await?;

    Ok((StatusCode::CREATED, Json(PlayerProfileResponse::from(player))))
}

#[instrument(skip(state, identity, payload), fields(profile_id = payload.profile_id))]
pub async fn create_coach_profile(
    identity: Identity,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCoachProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;
    let (profile_id, details, category_ids) = payload.into_details()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn)
        .create_coach_profile(profile_id, details, &category_ids)
        .await;
    let coach = finish(txn, result).await?;

    Ok((StatusCode::CREATED, Json(CoachProfileResponse::from(coach))))
}

#[instrument(skip(state, identity, payload), fields(id))]
pub async fn update_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    identity.require_admin()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn)
        .update_profile(id, payload.into())
        .await;
    let profile = finish(txn, result).await?;

    Ok(Json(profile.into()))
}

/// Admins and coaches may update player details, including roster activation.
#[instrument(skip(state, identity, payload), fields(id))]
pub async fn update_player_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePlayerProfileRequest>,
) -> Result<Json<PlayerProfileResponse>, AppError> {
    identity.require_admin_or_coach()?;
    let changes = payload.into_changes()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn)
        .update_player_profile(id, changes)
        .await;
    let player = finish(txn, result).await?;

    Ok(Json(player.into()))
}

#[instrument(skip(state, identity, payload), fields(id))]
pub async fn update_coach_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCoachProfileRequest>,
) -> Result<Json<CoachProfileResponse>, AppError> {
    identity.require_admin()?;
    let changes = payload.into_changes()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn)
        .update_coach_profile(id, changes)
        .await;
    let coach = finish(txn, result).await?;

    Ok(Json(coach.into()))
}

#[instrument(skip(state, identity), fields(id))]
pub async fn get_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProfileDetailsResponse>, AppError> {
    let linkage = ProfileLinkage::new(&state.db);
    let profile = linkage.find_profile(id).await?;
    require_reader(&identity, profile.user_id)?;

    let linked = linkage
        .linked_profiles(profile.user_id)
        .await?
        .into_iter()
        .find(|l| l.profile.id == profile.id)
        .ok_or_else(|| AppError::not_found("Profile", id))?;

    Ok(Json(with_details(&linkage, linked).await?))
}

#[instrument(skip(state, identity), fields(user_id))]
pub async fn list_user_profiles(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<ProfileDetailsResponse>>, AppError> {
    require_reader(&identity, user_id)?;

    let linkage = ProfileLinkage::new(&state.db);
    let mut data = Vec::new();
    for linked in linkage.linked_profiles(user_id).await? {
        data.push(with_details(&linkage, linked).await?);
    }
    Ok(Json(data))
}

#[instrument(skip(state, identity), fields(id))]
pub async fn get_player_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PlayerProfileResponse>, AppError> {
    let linkage = ProfileLinkage::new(&state.db);
    let player = linkage.find_player_profile(id).await?;
    let owner = owner_of(&linkage, player.profile_id).await?;
    require_reader(&identity, owner)?;

    Ok(Json(player.into()))
}

#[instrument(skip(state, identity), fields(id))]
pub async fn get_coach_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CoachProfileResponse>, AppError> {
    let linkage = ProfileLinkage::new(&state.db);
    let coach = linkage.find_coach_with_categories(id).await?;
    let owner = owner_of(&linkage, coach.coach.profile_id).await?;
    require_reader(&identity, owner)?;

    Ok(Json(coach.into()))
}

/// Delete a profile with its role-details and category associations.
#[instrument(skip(state, identity), fields(id))]
pub async fn delete_profile(
    identity: Identity,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    identity.require_admin()?;

    let txn = begin(&state.db).await?;
    let result = ProfileLinkage::new(&txn).delete_profile(id).await;
    finish(txn, result).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Profiles are readable by admins, coaches and the owning user.
fn require_reader(identity: &Identity, owner_id: i32) -> Result<(), AppError> {
    if identity.user_id() == owner_id {
        return Ok(());
    }
    identity.require_admin_or_coach()
}

async fn owner_of<C: ConnectionTrait>(
    linkage: &ProfileLinkage<'_, C>,
    profile_id: i32,
) -> Result<i32, AppError> {
    let profile: profile::Model = linkage.find_profile(profile_id).await?;
    Ok(profile.user_id)
}

async fn with_details<C: ConnectionTrait>(
    linkage: &ProfileLinkage<'_, C>,
    linked: LinkedProfile,
) -> Result<ProfileDetailsResponse, AppError> {
    let mut response = ProfileDetailsResponse {
        profile: linked.profile.into(),
        player_profile: None,
        coach_profile: None,
    };
    for detail in linked.details {
        match detail {
            ProfileDetail::Player(player) => response.player_profile = Some(player.into()),
            ProfileDetail::Coach(coach) => {
                let category_ids = linkage.category_ids_of(coach.id).await?;
                response.coach_profile = Some(CoachProfileResponse::new(coach, category_ids));
            }
            ProfileDetail::None => {}
        }
    }
    Ok(response)
}
