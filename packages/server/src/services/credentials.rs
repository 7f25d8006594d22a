use common::UserRole;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, IntoCondition, LikeExpr, LockType};
use sea_orm::*;
use thiserror::Error;

use crate::entity::{coach_profile, player_profile, profile, user};
use crate::error::AppError;
use crate::models::shared::escape_like;
use crate::utils::hash::{self, HashCost};

use super::is_unique_violation;
use super::profiles::ProfileLinkage;

/// Advisory lock key serializing MASTER assignments across transactions.
const MASTER_SLOT_LOCK: i64 = 0x434c_5542_4d53;

/// Why a login attempt was rejected. Every variant except `Database` surfaces to the
/// client as the same `INVALID_CREDENTIALS` response.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("no user named '{0}'")]
    UnknownUser(String),
    #[error("password mismatch for user {0}")]
    PasswordMismatch(i32),
    #[error("user {0} is inactive")]
    Inactive(i32),
    #[error("stored hash for user {0} is unreadable: {1}")]
    CorruptHash(i32, String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Database(e) => AppError::from(e),
            CredentialError::CorruptHash(user_id, detail) => {
                tracing::warn!(user_id, "Stored password hash unreadable: {}", detail);
                AppError::InvalidCredentials
            }
            other => {
                tracing::debug!("Credential check failed: {}", other);
                AppError::InvalidCredentials
            }
        }
    }
}

pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// Partial user update. `None` leaves the field untouched.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Filters for the admin user listing. Text filters are trimmed, case-insensitive
/// substring matches; blank ones are ignored.
#[derive(Debug, Default)]
pub struct UserQuery {
    pub page: u64,
    pub per_page: u64,
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub details: DetailFilter,
}

/// Matches users through the player or coach details of any of their profiles.
/// All given fields must match the same detail record.
#[derive(Debug, Default)]
pub struct DetailFilter {
    pub document: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl DetailFilter {
    fn is_empty(&self) -> bool {
        [&self.document, &self.first_name, &self.last_name]
            .into_iter()
            .all(|term| search_term(term).is_none())
    }
}

fn search_term(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// `lower(col) LIKE '%term%'` with LIKE metacharacters in `term` escaped.
fn contains_ci<T: IntoColumnRef>(col: T, term: &str) -> impl IntoCondition {
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

/// Owns user records: password hashing, credential checks and the MASTER singleton.
pub struct CredentialStore<'a, C: ConnectionTrait> {
    conn: &'a C,
    cost: HashCost,
}

impl<'a, C: ConnectionTrait> CredentialStore<'a, C> {
    pub fn new(conn: &'a C, cost: HashCost) -> Self {
        Self { conn, cost }
    }

    pub async fn create_user(&self, new: NewUser) -> Result<user::Model, AppError> {
        if new.role == UserRole::Master {
            self.guard_master_slot(None).await?;
        }
        if self.find_by_username(&new.username).await?.is_some() {
            return Err(AppError::UsernameTaken);
        }

        let password = hash::hash_password(&new.password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let now = chrono::Utc::now();
        let model = user::ActiveModel {
            username: Set(new.username),
            password: Set(password),
            role: Set(new.role),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        model.insert(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                tracing::debug!("Username race caught on insert");
                AppError::UsernameTaken
            } else {
                AppError::from(e)
            }
        })
    }

    /// `create_user` on behalf of an actor. Only a MASTER may create another MASTER.
    pub async fn create_user_as(
        &self,
        new: NewUser,
        actor_role: UserRole,
    ) -> Result<user::Model, AppError> {
        if new.role == UserRole::Master && actor_role != UserRole::Master {
            return Err(AppError::PermissionDenied);
        }
        self.create_user(new).await
    }

    pub async fn find_user(&self, id: i32) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))
    }

    /// Exact, case-sensitive lookup.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, DbErr> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn)
            .await
    }

    /// Returns the user only if it exists, is active and the password matches.
    pub async fn validate_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, CredentialError> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| CredentialError::UnknownUser(username.to_string()))?;

        let matches = hash::verify_password(password, &user.password)
            .map_err(|e| CredentialError::CorruptHash(user.id, e.to_string()))?;
        if !matches {
            return Err(CredentialError::PasswordMismatch(user.id));
        }
        if !user.is_active {
            return Err(CredentialError::Inactive(user.id));
        }

        Ok(user)
    }

    /// Apply `changes` to user `id` on behalf of an actor with role `actor_role`.
    pub async fn update_user(
        &self,
        id: i32,
        changes: UserChanges,
        actor_role: UserRole,
    ) -> Result<user::Model, AppError> {
        let existing = user::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))?;

        if existing.role == UserRole::Master && actor_role != UserRole::Master {
            return Err(AppError::PermissionDenied);
        }
        if changes.role == Some(UserRole::Master) && existing.role != UserRole::Master {
            if actor_role != UserRole::Master {
                return Err(AppError::PermissionDenied);
            }
            self.guard_master_slot(Some(id)).await?;
        }

        let mut active: user::ActiveModel = existing.clone().into();

        if let Some(username) = changes.username
            && username != existing.username
        {
            if self.find_by_username(&username).await?.is_some() {
                return Err(AppError::UsernameTaken);
            }
            active.username = Set(username);
        }
        if let Some(password) = changes.password {
            let stored = hash::hash_if_plaintext(&password, self.cost)
                .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
            active.password = Set(stored);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(chrono::Utc::now());

        active.update(self.conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::UsernameTaken
            } else {
                AppError::from(e)
            }
        })
    }

    /// Delete the user and every profile it owns. Run inside a transaction.
    pub async fn delete_user(&self, id: i32) -> Result<(), AppError> {
        let existing = user::Entity::find_by_id(id)
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::not_found("User", id))?;
        if existing.role == UserRole::Master {
            return Err(AppError::PermissionDenied);
        }

        ProfileLinkage::new(self.conn)
            .delete_profiles_of_user(id)
            .await?;
        user::Entity::delete_by_id(id).exec(self.conn).await?;

        Ok(())
    }

    pub async fn list(&self, query: UserQuery) -> Result<(Vec<user::Model>, u64), AppError> {
        let mut select = user::Entity::find();

        if let Some(search) = search_term(&query.search) {
            select = select.filter(contains_ci(user::Column::Username, search));
        }
        if let Some(role) = query.role {
            select = select.filter(user::Column::Role.eq(role));
        }
        if !query.details.is_empty() {
            let ids = self.user_ids_matching(&query.details).await?;
            select = select.filter(user::Column::Id.is_in(ids));
        }

        let paginator = select
            .order_by_asc(user::Column::Id)
            .paginate(self.conn, query.per_page);
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok((users, total))
    }

    /// Owners of any player or coach detail matching every field of `filter`.
    async fn user_ids_matching(&self, filter: &DetailFilter) -> Result<Vec<i32>, DbErr> {
        let mut players = player_profile::Entity::find()
            .select_only()
            .column(profile::Column::UserId)
            .join(JoinType::InnerJoin, player_profile::Relation::Profile.def());
        let mut coaches = coach_profile::Entity::find()
            .select_only()
            .column(profile::Column::UserId)
            .join(JoinType::InnerJoin, coach_profile::Relation::Profile.def());

        if let Some(term) = search_term(&filter.document) {
            players = players.filter(contains_ci(
                (player_profile::Entity, player_profile::Column::Document),
                term,
            ));
            coaches = coaches.filter(contains_ci(
                (coach_profile::Entity, coach_profile::Column::Document),
                term,
            ));
        }
        if let Some(term) = search_term(&filter.first_name) {
            players = players.filter(contains_ci(
                (player_profile::Entity, player_profile::Column::FirstName),
                term,
            ));
            coaches = coaches.filter(contains_ci(
                (coach_profile::Entity, coach_profile::Column::FirstName),
                term,
            ));
        }
        if let Some(term) = search_term(&filter.last_name) {
            players = players.filter(contains_ci(
                (player_profile::Entity, player_profile::Column::LastName),
                term,
            ));
            coaches = coaches.filter(contains_ci(
                (coach_profile::Entity, coach_profile::Column::LastName),
                term,
            ));
        }

        let mut ids: Vec<i32> = players.into_tuple().all(self.conn).await?;
        ids.extend(coaches.into_tuple::<i32>().all(self.conn).await?);
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// Serialize MASTER assignment and refuse it if another MASTER exists.
    /// `exclude` is the user being promoted, if any.
    async fn guard_master_slot(&self, exclude: Option<i32>) -> Result<(), AppError> {
        let backend = self.conn.get_database_backend();
        if backend == DbBackend::Postgres {
            self.conn
                .execute_raw(Statement::from_string(
                    backend,
                    format!("SELECT pg_advisory_xact_lock({MASTER_SLOT_LOCK})"),
                ))
                .await?;
        }

        let mut existing = user::Entity::find().filter(user::Column::Role.eq(UserRole::Master));
        if let Some(id) = exclude {
            existing = existing.filter(user::Column::Id.ne(id));
        }
        if existing.one(self.conn).await?.is_some() {
            return Err(AppError::Conflict("A MASTER account already exists".into()));
        }
        Ok(())
    }
}
