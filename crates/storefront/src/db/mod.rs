//! Database operations for the storefront `PostgreSQL`.
//!
//! # Schema: `mercado`
//!
//! ## Tables
//!
//! - `user` - Login identities (username, email, argon2 hash)
//! - `customer` - One balance-holding profile per user
//! - `product` - Catalog
//! - `transaction` - Append-only purchase ledger
//! - `email_verification` - Single-use verification codes
//! - `token_blacklist` - Revoked refresh tokens
//!
//! Repository structs borrow the pool for standalone statements. Steps that
//! must share a database transaction are free functions taking a
//! `&mut PgConnection`, so the service that owns the transaction decides
//! what commits together.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p mercado-cli -- migrate
//! ```

pub mod customers;
pub mod products;
pub mod token_blacklist;
pub mod transactions;
pub mod users;
pub mod verifications;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use customers::CustomerRepository;
pub use products::ProductRepository;
pub use token_blacklist::TokenBlacklistRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;
pub use verifications::EmailVerificationRepository;

/// `numeric_value_out_of_range`
const NUMERIC_OVERFLOW: &str = "22003";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; carries the constraint name.
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// CHECK constraint violation; carries the constraint name.
    #[error("check violation: {0}")]
    CheckViolation(String),

    /// A value does not fit its `NUMERIC` column.
    #[error("numeric value out of range")]
    NumericOverflow,
}

impl RepositoryError {
    /// Classify a sqlx error by the constraint or SQLSTATE it reports.
    pub(crate) fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            let constraint = || db_err.constraint().unwrap_or_default().to_owned();
            if db_err.is_unique_violation() {
                return Self::Conflict(constraint());
            }
            if db_err.is_check_violation() {
                return Self::CheckViolation(constraint());
            }
            if db_err.code().as_deref() == Some(NUMERIC_OVERFLOW) {
                return Self::NumericOverflow;
            }
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
