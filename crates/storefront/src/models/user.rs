//! User domain types.

use chrono::{DateTime, Utc};

use mercado_core::{Email, UserId, Username};

/// A login identity (domain type).
///
/// The password hash is deliberately absent; repositories return it alongside
/// the user only where a password must be checked.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Unique email address, used to look up verification records.
    pub email: Email,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
