//! Revoked refresh tokens.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::UserId;

use super::RepositoryError;

/// Repository for the refresh-token blacklist.
pub struct TokenBlacklistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TokenBlacklistRepository<'a> {
    /// Create a new blacklist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether the token with this `jti` has been revoked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM mercado.token_blacklist WHERE jti = $1
            )
            ",
        )
        .bind(jti)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Revoke a token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the `jti` is already revoked.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        jti: Uuid,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO mercado.token_blacklist (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(jti)
        .bind(user_id.as_i32())
        .bind(expires_at)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(())
    }

    /// Drop entries whose token has expired anyway. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM mercado.token_blacklist
            WHERE expires_at < NOW()
            ",
        )
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
