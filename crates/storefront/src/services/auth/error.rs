//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] mercado_core::UsernameError),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] mercado_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The user behind a valid token no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Email already registered.
    #[error("email already exists")]
    EmailTaken,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// No verification record for the email.
    #[error("verification record not found")]
    VerificationNotFound,

    /// Wrong code, or the email is already verified.
    #[error("invalid or already used verification code")]
    InvalidVerificationCode,

    /// Current password did not match on password change.
    #[error("current password is incorrect")]
    WrongCurrentPassword,

    /// New password and confirmation differ.
    #[error("password confirmation does not match")]
    PasswordMismatch,

    /// Token could not be issued or was rejected.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Logout was given an unusable refresh token.
    #[error("logout failed: {0}")]
    Logout(TokenError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
