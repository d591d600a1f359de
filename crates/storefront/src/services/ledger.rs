//! Customer balance top-ups.

use sqlx::PgPool;
use thiserror::Error;

use mercado_core::{AmountError, Money, UserId};

use crate::db::{CustomerRepository, RepositoryError};

/// Errors raised by balance operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The amount is not numeric or does not fit a balance column.
    #[error("invalid amount: {0}")]
    InvalidAmount(AmountError),

    /// The user has no customer profile.
    #[error("customer not found")]
    CustomerNotFound,

    /// The top-up would leave the balance below zero.
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Balance operations for a customer.
pub struct LedgerService<'a> {
    customers: CustomerRepository<'a>,
}

impl<'a> LedgerService<'a> {
    /// Create a new ledger service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool),
        }
    }

    /// Add a JSON number or numeric string to the user's balance.
    ///
    /// A missing customer is reported ahead of a malformed amount.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CustomerNotFound`, `LedgerError::InvalidAmount`
    /// or `LedgerError::InsufficientFunds` when a negative amount would take
    /// the balance below zero.
    pub async fn add_balance(
        &self,
        user_id: UserId,
        value: &serde_json::Value,
    ) -> Result<Money, LedgerError> {
        let amount = match Money::parse_amount(value) {
            Ok(amount) => amount,
            Err(e) => {
                return if self.customers.get_by_user(user_id).await?.is_none() {
                    Err(LedgerError::CustomerNotFound)
                } else {
                    Err(LedgerError::InvalidAmount(e))
                };
            }
        };

        let balance = self
            .customers
            .add_balance(user_id, amount)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => LedgerError::CustomerNotFound,
                RepositoryError::CheckViolation(_) => LedgerError::InsufficientFunds,
                RepositoryError::NumericOverflow => {
                    LedgerError::InvalidAmount(AmountError::TooLarge)
                }
                other => LedgerError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, amount = %amount, balance = %balance, "Balance updated");
        Ok(balance)
    }
}
