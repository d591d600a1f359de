//! Application state shared across handlers.

use std::sync::Arc;

use lettre::transport::smtp::Error as SmtpError;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{EmailService, TokenService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    tokens: TokenService,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if SMTP is configured but the relay cannot be set up.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, SmtpError> {
        let tokens = TokenService::new(&config.jwt);
        let email = match &config.email {
            Some(email_config) => Some(EmailService::new(email_config)?),
            None => {
                tracing::warn!("SMTP not configured; verification codes will not be emailed");
                None
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                email,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the JWT service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// The mailer, if SMTP is configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
