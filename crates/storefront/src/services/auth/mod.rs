//! Authentication service.
//!
//! Registration with email verification, password login, JWT refresh and
//! logout, and password changes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use mercado_core::{Email, UserId, Username, VerificationCode};

use crate::db::users::{EMAIL_CONSTRAINT, USERNAME_CONSTRAINT};
use crate::db::{
    EmailVerificationRepository, RepositoryError, TokenBlacklistRepository, UserRepository,
    customers, users, verifications,
};
use crate::models::User;
use crate::services::tokens::{TokenError, TokenPair, TokenService, TokenType};

/// Authentication service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    users: UserRepository<'a>,
    verifications: EmailVerificationRepository<'a>,
    blacklist: TokenBlacklistRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            pool,
            users: UserRepository::new(pool),
            verifications: EmailVerificationRepository::new(pool),
            blacklist: TokenBlacklistRepository::new(pool),
            tokens,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a new user.
    ///
    /// The user, their zero-balance customer and a fresh verification code
    /// are created in one transaction. The caller delivers the returned code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` / `AuthError::InvalidEmail` for
    /// malformed input, `AuthError::WeakPassword` for an empty password, and
    /// `AuthError::UsernameTaken` / `AuthError::EmailTaken` on conflicts.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(User, VerificationCode), AuthError> {
        let username = Username::parse(username)?;
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let code = VerificationCode::generate();

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let user = users::insert(&mut tx, &username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(constraint) if constraint == USERNAME_CONSTRAINT => {
                    AuthError::UsernameTaken
                }
                RepositoryError::Conflict(constraint) if constraint == EMAIL_CONSTRAINT => {
                    AuthError::EmailTaken
                }
                other => AuthError::Repository(other),
            })?;
        customers::insert(&mut tx, user.id).await?;
        verifications::insert(&mut tx, user.id, &code).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok((user, code))
    }

    /// Consume a verification code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::VerificationNotFound` if no record exists for the
    /// email and `AuthError::InvalidVerificationCode` if the code is wrong or
    /// was already used.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<(), AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::VerificationNotFound);
        };

        if self.verifications.verify(&email, code).await? {
            tracing::info!(email = %email, "Email verified");
            return Ok(());
        }

        if self.verifications.exists_for_email(&email).await? {
            Err(AuthError::InvalidVerificationCode)
        } else {
            Err(AuthError::VerificationNotFound)
        }
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let (user, password_hash) = self
            .users
            .get_with_password_hash(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let pair = self.tokens.issue_pair(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(pair)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is invalid, expired, of the
    /// wrong type or revoked, and `AuthError::UserNotFound` if its user is gone.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.decode(refresh_token, TokenType::Refresh)?;

        if self.blacklist.contains(claims.jti).await? {
            return Err(TokenError::Revoked.into());
        }

        self.users
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(self.tokens.issue(claims.sub, TokenType::Access)?)
    }

    /// Revoke a refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Logout` if the token is invalid or already revoked.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self
            .tokens
            .decode(refresh_token, TokenType::Refresh)
            .map_err(AuthError::Logout)?;
        let expires_at = claims.expires_at().map_err(AuthError::Logout)?;

        self.blacklist
            .insert(claims.jti, claims.sub, expires_at)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::Logout(TokenError::Revoked),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %claims.sub, "Refresh token revoked");

        match self.blacklist.purge_expired().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, "Purged expired blacklist entries"),
            Err(e) => tracing::warn!(error = %e, "Failed to purge expired blacklist entries"),
        }

        Ok(())
    }

    /// Resolve a bearer access token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is unusable and
    /// `AuthError::UserNotFound` if the user was deleted.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.decode(access_token, TokenType::Access)?;

        self.users
            .get_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    // =========================================================================
    // Password Management
    // =========================================================================

    /// Change a user's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongCurrentPassword`, `AuthError::PasswordMismatch`
    /// or `AuthError::WeakPassword`, checked in that order.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_password(current, &password_hash).map_err(|_| AuthError::WrongCurrentPassword)?;

        if new != confirm {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(new)?;

        let new_hash = hash_password(new)?;
        self.users.update_password_hash(user_id, &new_hash).await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword(
            "password cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
