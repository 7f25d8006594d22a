use std::collections::HashSet;

use chrono::NaiveDate;
use common::{ProfileType, UserRole};
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::*;

use crate::entity::{coach_profile, coach_profile_category, player_profile, profile, user};
use crate::error::AppError;

use super::categories::CategoryDirectory;
use super::is_unique_violation;

/// Role-detail attached to a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileDetail {
    Player(player_profile::Model),
    Coach(coach_profile::Model),
    None,
}

/// A profile together with every role-detail reachable from it.
#[derive(Debug, Clone)]
pub struct LinkedProfile {
    pub profile: profile::Model,
    pub details: Vec<ProfileDetail>,
}

/// Optional overrides used when a coach profile is created implicitly.
#[derive(Debug, Default, Clone)]
pub struct Provisioning {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    pub document: Option<String>,
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub user_id: i32,
    pub profile_type: ProfileType,
    pub category_id: Option<i32>,
    pub coach_profile_id: Option<i32>,
    pub provisioning: Option<Provisioning>,
}

#[derive(Debug, Clone)]
pub struct PlayerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub document: String,
    pub document_type: String,
    pub birth_date: Option<NaiveDate>,
    pub family_name: Option<String>,
    pub family_contact: Option<String>,
    pub relationship: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct CoachDetails {
    pub first_name: String,
    pub last_name: String,
    pub document_type: String,
    pub document: Option<String>,
}

/// `Some(None)` clears a nullable reference, `None` leaves it untouched.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub profile_type: Option<ProfileType>,
    pub category_id: Option<Option<i32>>,
    pub coach_profile_id: Option<Option<i32>>,
}

#[derive(Debug, Default)]
pub struct PlayerProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub document: Option<String>,
    pub document_type: Option<String>,
    pub birth_date: Option<Option<NaiveDate>>,
    pub family_name: Option<Option<String>>,
    pub family_contact: Option<Option<String>>,
    pub relationship: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default)]
pub struct CoachProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub document_type: Option<String>,
    pub document: Option<Option<String>>,
    /// `None` keeps the associations, `Some(vec![])` clears them, otherwise replaces the set.
    pub category_ids: Option<Vec<i32>>,
}

/// A coach profile with its category set.
#[derive(Debug, Clone)]
pub struct CoachWithCategories {
    pub coach: coach_profile::Model,
    pub category_ids: Vec<i32>,
}

/// Administrators and the master coach implicitly, as does any ADMIN profile.
pub fn auto_provisions_coach(profile_type: ProfileType, role: UserRole) -> bool {
    profile_type == ProfileType::Admin || role.is_administrative()
}

/// Whether a coach role-detail may hang off a profile of this type owned by this role.
pub fn admits_coach_detail(profile_type: ProfileType, role: UserRole) -> bool {
    profile_type.admits_coach_detail() || role.is_administrative()
}

/// Maintains the User → Profile → role-detail graph.
pub struct ProfileLinkage<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProfileLinkage<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Create a profile, provisioning a coach role-detail when the owner is an administrator
    /// or the profile is of type ADMIN.
    pub async fn create_profile(&self, new: NewProfile) -> Result<profile::Model, AppError> {
        let owner = self.find_user(new.user_id).await?;

        if self
            .find_by_user_and_type(owner.id, new.profile_type)
            .await?
            .is_some()
        {
            return Err(duplicate_profile(owner.id, new.profile_type));
        }
        if let Some(category_id) = new.category_id {
            CategoryDirectory::new(self.conn).find_one(category_id).await?;
        }
        if let Some(coach_id) = new.coach_profile_id {
            self.find_coach_profile(coach_id).await?;
        }

        let model = profile::ActiveModel {
            user_id: Set(owner.id),
            profile_type: Set(new.profile_type),
            category_id: Set(new.category_id),
            coach_profile_id: Set(new.coach_profile_id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let saved = model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_profile(owner.id, new.profile_type)
            } else {
                AppError::from(e)
            }
        })?;

        if auto_provisions_coach(saved.profile_type, owner.role) {
            self.ensure_coach_profile(&saved, &owner, new.provisioning.unwrap_or_default())
                .await?;
        }

        Ok(saved)
    }

    /// Create the coach role-detail for `profile` unless one already exists.
    async fn ensure_coach_profile(
        &self,
        profile: &profile::Model,
        owner: &user::Model,
        fields: Provisioning,
    ) -> Result<Option<coach_profile::Model>, AppError> {
        if self.coach_of_profile(profile.id).await?.is_some() {
            return Ok(None);
        }

        let category_ids = dedup(&fields.category_ids);
        CategoryDirectory::new(self.conn)
            .require_all(&category_ids)
            .await?;

        let details = CoachDetails {
            first_name: fields.first_name.unwrap_or_else(|| owner.username.clone()),
            last_name: fields.last_name.unwrap_or_default(),
            document_type: fields
                .document_type
                .unwrap_or_else(|| coach_profile::UNKNOWN_DOCUMENT_TYPE.to_string()),
            document: fields.document,
        };
        let coach = self.insert_coach(profile.id, details).await?;
        self.replace_categories(coach.id, &category_ids).await?;

        tracing::info!(
            profile_id = profile.id,
            coach_profile_id = coach.id,
            "Provisioned coach profile"
        );
        Ok(Some(coach))
    }

    pub async fn create_player_profile(
        &self,
        profile_id: i32,
        details: PlayerDetails,
    ) -> Result<player_profile::Model, AppError> {
        let profile = self.find_profile(profile_id).await?;
        if profile.profile_type != ProfileType::Player {
            return Err(AppError::Validation(format!(
                "Profile {} has type {}; player details require a PLAYER profile",
                profile.id, profile.profile_type
            )));
        }
        if self.player_of_profile(profile.id).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Profile {} already has a player profile",
                profile.id
            )));
        }

        let now = chrono::Utc::now();
        let model = player_profile::ActiveModel {
            profile_id: Set(profile.id),
            first_name: Set(details.first_name),
            last_name: Set(details.last_name),
            email: Set(details.email),
            document: Set(details.document),
            document_type: Set(details.document_type),
            birth_date: Set(details.birth_date),
            family_name: Set(details.family_name),
            family_contact: Set(details.family_contact),
            relationship: Set(details.relationship),
            is_active: Set(details.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "Profile {} already has a player profile",
                    profile.id
                ))
            } else {
                AppError::from(e)
            }
        })
    }

    pub async fn create_coach_profile(
        &self,
        profile_id: i32,
        details: CoachDetails,
        category_ids: &[i32],
    ) -> Result<CoachWithCategories, AppError> {
        let profile = self.find_profile(profile_id).await?;
        let owner = self.find_user(profile.user_id).await?;
        if !admits_coach_detail(profile.profile_type, owner.role) {
            return Err(AppError::Validation(format!(
                "Profile {} has type {}; coach details require a COACH or ADMIN profile",
                profile.id, profile.profile_type
            )));
        }
        if self.coach_of_profile(profile.id).await?.is_some() {
            return Err(duplicate_coach(profile.id));
        }

        let category_ids = dedup(category_ids);
        CategoryDirectory::new(self.conn)
            .require_all(&category_ids)
            .await?;

        let coach = self.insert_coach(profile.id, details).await?;
        self.replace_categories(coach.id, &category_ids).await?;

        Ok(CoachWithCategories {
            coach,
            category_ids,
        })
    }

    async fn insert_coach(
        &self,
        profile_id: i32,
        details: CoachDetails,
    ) -> Result<coach_profile::Model, AppError> {
        let now = chrono::Utc::now();
        let model = coach_profile::ActiveModel {
            profile_id: Set(profile_id),
            first_name: Set(details.first_name),
            last_name: Set(details.last_name),
            document_type: Set(details.document_type),
            document: Set(details.document),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                duplicate_coach(profile_id)
            } else {
                AppError::from(e)
            }
        })
    }

    pub async fn update_profile(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<profile::Model, AppError> {
        let existing = profile::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", id))?;

        let mut active: profile::ActiveModel = existing.clone().into();

        if let Some(new_type) = changes.profile_type
            && new_type != existing.profile_type
        {
            if self
                .find_by_user_and_type(existing.user_id, new_type)
                .await?
                .is_some()
            {
                return Err(duplicate_profile(existing.user_id, new_type));
            }
            if new_type != ProfileType::Player
                && self.player_of_profile(existing.id).await?.is_some()
            {
                return Err(AppError::Validation(format!(
                    "Profile {} has player details and must stay PLAYER",
                    existing.id
                )));
            }
            let owner = self.find_user(existing.user_id).await?;
            if !admits_coach_detail(new_type, owner.role)
                && self.coach_of_profile(existing.id).await?.is_some()
            {
                return Err(AppError::Validation(format!(
                    "Profile {} has coach details and cannot become {}",
                    existing.id, new_type
                )));
            }
            active.profile_type = Set(new_type);
        }

        if let Some(category_id) = changes.category_id {
            if let Some(category_id) = category_id {
                CategoryDirectory::new(self.conn).find_one(category_id).await?;
            }
            active.category_id = Set(category_id);
        }
        if let Some(coach_id) = changes.coach_profile_id {
            if let Some(coach_id) = coach_id {
                self.find_coach_profile(coach_id).await?;
            }
            active.coach_profile_id = Set(coach_id);
        }

        active.update(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!(
                    "User {} already has a profile of that type",
                    existing.user_id
                ))
            } else {
                AppError::from(e)
            }
        })
    }

    pub async fn update_player_profile(
        &self,
        id: i32,
        changes: PlayerProfileChanges,
    ) -> Result<player_profile::Model, AppError> {
        let existing = player_profile::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("PlayerProfile", id))?;

        let mut active: player_profile::ActiveModel = existing.into();
        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.email {
            active.email = Set(v);
        }
        if let Some(v) = changes.document {
            active.document = Set(v);
        }
        if let Some(v) = changes.document_type {
            active.document_type = Set(v);
        }
        if let Some(v) = changes.birth_date {
            active.birth_date = Set(v);
        }
        if let Some(v) = changes.family_name {
            active.family_name = Set(v);
        }
        if let Some(v) = changes.family_contact {
            active.family_contact = Set(v);
        }
        if let Some(v) = changes.relationship {
            active.relationship = Set(v);
        }
        if let Some(v) = changes.is_active {
            active.is_active = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(self.conn).await?)
    }

    /// Partial update. A new category set is validated in full before anything is written,
    /// then swapped in with delete-then-insert on the same connection.
    pub async fn update_coach_profile(
        &self,
        id: i32,
        changes: CoachProfileChanges,
    ) -> Result<CoachWithCategories, AppError> {
        let existing = coach_profile::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("CoachProfile", id))?;

        let category_ids = changes.category_ids.as_deref().map(dedup);
        if let Some(ids) = &category_ids {
            CategoryDirectory::new(self.conn).require_all(ids).await?;
        }

        let mut active: coach_profile::ActiveModel = existing.into();
        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }
        if let Some(v) = changes.document_type {
            active.document_type = Set(v);
        }
        if let Some(v) = changes.document {
            active.document = Set(v);
        }
        active.updated_at = Set(chrono::Utc::now());
        let coach = active.update(self.conn).await?;

        let category_ids = match category_ids {
            Some(ids) => {
                self.replace_categories(coach.id, &ids).await?;
                ids
            }
            None => self.category_ids_of(coach.id).await?,
        };

        Ok(CoachWithCategories {
            coach,
            category_ids,
        })
    }

    async fn replace_categories(&self, coach_id: i32, ids: &[i32]) -> Result<(), AppError> {
        coach_profile_category::Entity::delete_many()
            .filter(coach_profile_category::Column::CoachProfileId.eq(coach_id))
            .exec(self.conn)
            .await?;

        if ids.is_empty() {
            return Ok(());
        }
        let rows = ids.iter().map(|&category_id| coach_profile_category::ActiveModel {
            coach_profile_id: Set(coach_id),
            category_id: Set(category_id),
            ..Default::default()
        });
        coach_profile_category::Entity::insert_many(rows)
            .exec(self.conn)
            .await?;
        Ok(())
    }

    pub async fn category_ids_of(&self, coach_id: i32) -> Result<Vec<i32>, AppError> {
        Ok(coach_profile_category::Entity::find()
            .filter(coach_profile_category::Column::CoachProfileId.eq(coach_id))
            .order_by_asc(coach_profile_category::Column::CategoryId)
            .select_only()
            .column(coach_profile_category::Column::CategoryId)
            .into_tuple()
            .all(self.conn)
            .await?)
    }

    pub async fn find_profile(&self, id: i32) -> Result<profile::Model, AppError> {
        profile::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", id))
    }

    pub async fn find_player_profile(&self, id: i32) -> Result<player_profile::Model, AppError> {
        player_profile::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("PlayerProfile", id))
    }

    pub async fn find_coach_profile(&self, id: i32) -> Result<coach_profile::Model, AppError> {
        coach_profile::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("CoachProfile", id))
    }

    pub async fn find_coach_with_categories(
        &self,
        id: i32,
    ) -> Result<CoachWithCategories, AppError> {
        let coach = self.find_coach_profile(id).await?;
        let category_ids = self.category_ids_of(coach.id).await?;
        Ok(CoachWithCategories {
            coach,
            category_ids,
        })
    }

    pub async fn find_by_user_and_type(
        &self,
        user_id: i32,
        profile_type: ProfileType,
    ) -> Result<Option<profile::Model>, AppError> {
        Ok(profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .filter(profile::Column::ProfileType.eq(profile_type))
            .one(self.conn)
            .await?)
    }

    pub async fn player_of_profile(
        &self,
        profile_id: i32,
    ) -> Result<Option<player_profile::Model>, AppError> {
        Ok(player_profile::Entity::find()
            .filter(player_profile::Column::ProfileId.eq(profile_id))
            .one(self.conn)
            .await?)
    }

    pub async fn coach_of_profile(
        &self,
        profile_id: i32,
    ) -> Result<Option<coach_profile::Model>, AppError> {
        Ok(coach_profile::Entity::find()
            .filter(coach_profile::Column::ProfileId.eq(profile_id))
            .one(self.conn)
            .await?)
    }

    /// Every profile of a user with its role-details, in profile id order.
    pub async fn linked_profiles(&self, user_id: i32) -> Result<Vec<LinkedProfile>, AppError> {
        let profiles = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .order_by_asc(profile::Column::Id)
            .all(self.conn)
            .await?;
        if profiles.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = profiles.iter().map(|p| p.id).collect();
        let players = player_profile::Entity::find()
            .filter(player_profile::Column::ProfileId.is_in(ids.clone()))
            .all(self.conn)
            .await?;
        let coaches = coach_profile::Entity::find()
            .filter(coach_profile::Column::ProfileId.is_in(ids))
            .all(self.conn)
            .await?;

        Ok(profiles
            .into_iter()
            .map(|profile| {
                let mut details: Vec<ProfileDetail> = players
                    .iter()
                    .filter(|p| p.profile_id == profile.id)
                    .cloned()
                    .map(ProfileDetail::Player)
                    .chain(
                        coaches
                            .iter()
                            .filter(|c| c.profile_id == profile.id)
                            .cloned()
                            .map(ProfileDetail::Coach),
                    )
                    .collect();
                if details.is_empty() {
                    details.push(ProfileDetail::None);
                }
                LinkedProfile { profile, details }
            })
            .collect())
    }

    /// Delete a profile with its role-details. Run inside a transaction.
    pub async fn delete_profile(&self, id: i32) -> Result<(), AppError> {
        let profile = profile::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("Profile", id))?;
        self.remove_profile(&profile).await
    }

    pub async fn delete_profiles_of_user(&self, user_id: i32) -> Result<(), AppError> {
        let profiles = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .lock(LockType::Update)
            .all(self.conn)
            .await?;
        for profile in &profiles {
            self.remove_profile(profile).await?;
        }
        Ok(())
    }

    async fn remove_profile(&self, profile: &profile::Model) -> Result<(), AppError> {
        player_profile::Entity::delete_many()
            .filter(player_profile::Column::ProfileId.eq(profile.id))
            .exec(self.conn)
            .await?;

        if let Some(coach) = self.coach_of_profile(profile.id).await? {
            coach_profile_category::Entity::delete_many()
                .filter(coach_profile_category::Column::CoachProfileId.eq(coach.id))
                .exec(self.conn)
                .await?;
            // Players assigned to this coach lose the assignment.
            profile::Entity::update_many()
                .col_expr(
                    profile::Column::CoachProfileId,
                    Expr::value(Option::<i32>::None),
                )
                .filter(profile::Column::CoachProfileId.eq(coach.id))
                .exec(self.conn)
                .await?;
            coach_profile::Entity::delete_by_id(coach.id)
                .exec(self.conn)
                .await?;
        }

        profile::Entity::delete_by_id(profile.id)
            .exec(self.conn)
            .await?;
        Ok(())
    }

    async fn find_user(&self, id: i32) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }
}

fn duplicate_profile(user_id: i32, profile_type: ProfileType) -> AppError {
    AppError::Conflict(format!(
        "User {user_id} already has a {profile_type} profile"
    ))
}

fn duplicate_coach(profile_id: i32) -> AppError {
    AppError::Conflict(format!(
        "Profile {profile_id} already has a coach profile"
    ))
}

/// Drop repeated ids, keeping first occurrences in order.
fn dedup(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
