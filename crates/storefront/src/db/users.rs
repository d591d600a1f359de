//! User repository for database operations.
//!
//! Queries are checked at runtime (`sqlx::query_as`) so the crate builds
//! without a live database.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use mercado_core::{Email, UserId, Username};

use super::RepositoryError;
use crate::models::User;

/// Unique constraint on `user.username`.
pub const USERNAME_CONSTRAINT: &str = "user_username_key";
/// Unique constraint on `user.email`.
pub const EMAIL_CONSTRAINT: &str = "user_email_key";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    username: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username, email, created_at, updated_at
            FROM mercado.user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored fields are invalid.
    pub async fn get_with_password_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHashRow>(
            r"
            SELECT id, username, email, created_at, updated_at, password_hash
            FROM mercado.user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let user = User::try_from(row.user)?;
        Ok(Some((user, row.password_hash)))
    }

    /// Get a user's password hash by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            r"
            SELECT password_hash
            FROM mercado.user
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE mercado.user
            SET password_hash = $1, updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(password_hash)
        .bind(id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Insert a user inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` carrying [`USERNAME_CONSTRAINT`] or
/// [`EMAIL_CONSTRAINT`] if either is already taken.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut PgConnection,
    username: &Username,
    email: &Email,
    password_hash: &str,
) -> Result<User, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
        r"
        INSERT INTO mercado.user (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, email, created_at, updated_at
        ",
    )
    .bind(username.as_str())
    .bind(email.as_str())
    .bind(password_hash)
    .fetch_one(conn)
    .await
    .map_err(RepositoryError::classify)?;

    User::try_from(row)
}

/// Resolve a username to its ID inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_id_by_username(
    conn: &mut PgConnection,
    username: &str,
) -> Result<Option<UserId>, RepositoryError> {
    let id = sqlx::query_scalar::<_, i32>(
        r"
        SELECT id
        FROM mercado.user
        WHERE username = $1
        ",
    )
    .bind(username)
    .fetch_optional(conn)
    .await?;

    Ok(id.map(UserId::new))
}

/// Delete a user inside an open transaction.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn delete(conn: &mut PgConnection, id: UserId) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM mercado.user
        WHERE id = $1
        ",
    )
    .bind(id.as_i32())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
