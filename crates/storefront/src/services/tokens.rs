//! JWT issuance and validation.
//!
//! Access and refresh tokens are HS256 JWTs signed with the same secret and
//! told apart by a `token_type` claim. Every token carries a random `jti` so
//! a single refresh token can be revoked on logout. This module is pure: the
//! blacklist and user lookups live in [`crate::services::auth`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use mercado_core::UserId;

use crate::config::JwtConfig;

/// Errors raised while issuing or reading tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encode(jsonwebtoken::errors::Error),

    /// Malformed, badly signed or expired.
    #[error("Token inválido ou expirado.")]
    Invalid,

    /// An access token where a refresh token was expected, or vice versa.
    #[error("Tipo de token inválido.")]
    WrongType,

    /// The refresh token was revoked by a logout.
    #[error("Token está na blacklist.")]
    Revoked,
}

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived bearer token for protected routes.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

/// JWT claims for both token types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User the token was issued to.
    pub sub: UserId,
    /// Unique token ID.
    pub jti: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Access or refresh.
    pub token_type: TokenType,
}

impl Claims {
    /// Expiry as a timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] if `exp` is outside the representable range.
    pub fn expires_at(&self) -> Result<DateTime<Utc>, TokenError> {
        DateTime::from_timestamp(self.exp, 0).ok_or(TokenError::Invalid)
    }
}

/// An access/refresh token pair, as returned by login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Access token.
    pub access: String,
    /// Refresh token.
    pub refresh: String,
}

/// Signs and verifies tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl: config.access_token_ttl,
            refresh_ttl: config.refresh_token_ttl,
        }
    }

    /// Issue a fresh access/refresh pair.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user_id, TokenType::Access)?,
            refresh: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Issue a single token of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encode`] if signing fails.
    pub fn issue(&self, user_id: UserId, token_type: TokenType) -> Result<String, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat,
            exp: iat.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
            token_type,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Verify signature, expiry and type.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for malformed, badly signed or expired
    /// tokens and [`TokenError::WrongType`] if the type does not match.
    pub fn decode(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            TokenError::Invalid
        })?;

        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }

        Ok(data.claims)
    }
}
