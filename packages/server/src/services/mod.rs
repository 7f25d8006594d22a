//! Identity core: credentials, profile linkage, capability resolution and the
//! transactional flows composing them.
//!
//! Every service borrows a `ConnectionTrait`, so the same code runs on the pool or
//! inside a `DatabaseTransaction` owned by the caller.

pub mod capabilities;
pub mod categories;
pub mod credentials;
pub mod profiles;
pub mod provisioning;

use sea_orm::{DatabaseTransaction, DbErr, SqlErr, TransactionTrait};

use crate::error::AppError;

/// Returns true if the database rejected a write on a unique constraint.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Commit on success, roll back on failure. The original error is returned unchanged.
pub async fn finish<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!("Rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}

/// Start a transaction on any connection that supports one.
pub async fn begin<C: TransactionTrait<Transaction = DatabaseTransaction>>(db: &C) -> Result<DatabaseTransaction, AppError> {
    Ok(db.begin().await?)
}
