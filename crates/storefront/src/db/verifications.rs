//! Email verification repository.

use sqlx::{PgConnection, PgPool};

use mercado_core::{Email, UserId, VerificationCode};

use super::RepositoryError;

/// Repository for email verification records.
pub struct EmailVerificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmailVerificationRepository<'a> {
    /// Create a new email verification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Mark the record for `email` verified if it is still pending and `code`
    /// matches exactly.
    ///
    /// The check and the write are one statement, so at most one of several
    /// concurrent attempts can return `true`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn verify(&self, email: &Email, code: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE mercado.email_verification v
            SET is_verified = TRUE
            FROM mercado.user u
            WHERE v.user_id = u.id
              AND u.email = $1
              AND v.is_verified = FALSE
              AND v.verification_code = $2
            ",
        )
        .bind(email.as_str())
        .bind(code)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether any verification record exists for `email`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_for_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1
                FROM mercado.email_verification v
                JOIN mercado.user u ON u.id = v.user_id
                WHERE u.email = $1
            )
            ",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }
}

/// Store a fresh code for a user inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the user already has a record.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut PgConnection,
    user_id: UserId,
    code: &VerificationCode,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO mercado.email_verification (user_id, verification_code)
        VALUES ($1, $2)
        ",
    )
    .bind(user_id.as_i32())
    .bind(code.as_str())
    .execute(conn)
    .await
    .map_err(RepositoryError::classify)?;

    Ok(())
}

/// Delete a user's verification record inside an open transaction.
///
/// Returns `true` if a record existed.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete_by_user(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM mercado.email_verification
        WHERE user_id = $1
        ",
    )
    .bind(user_id.as_i32())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
