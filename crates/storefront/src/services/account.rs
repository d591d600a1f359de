//! Account termination.

use sqlx::PgPool;
use thiserror::Error;

use mercado_core::UserId;

use crate::db::{RepositoryError, customers, users, verifications};

/// Errors raised when deleting an account.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The user has no customer profile; nothing was deleted.
    #[error("customer not found")]
    CustomerNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// How an account deletion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Customer, verification record and user were removed.
    Deleted,
    /// Customer and user were removed; there was no verification record.
    DeletedWithoutVerification,
}

/// Delete a user's customer, verification record and identity in one
/// transaction. Purchase history goes with the customer.
///
/// # Errors
///
/// Returns `AccountError::CustomerNotFound` if the user has no customer, in
/// which case nothing is deleted.
pub async fn delete_user(pool: &PgPool, user_id: UserId) -> Result<DeleteOutcome, AccountError> {
    let mut tx = pool.begin().await.map_err(RepositoryError::from)?;

    if !customers::delete_by_user(&mut tx, user_id).await? {
        return Err(AccountError::CustomerNotFound);
    }
    let had_verification = verifications::delete_by_user(&mut tx, user_id).await?;
    users::delete(&mut tx, user_id).await?;

    tx.commit().await.map_err(RepositoryError::from)?;

    tracing::info!(user_id = %user_id, had_verification, "User deleted");

    Ok(if had_verification {
        DeleteOutcome::Deleted
    } else {
        DeleteOutcome::DeletedWithoutVerification
    })
}
