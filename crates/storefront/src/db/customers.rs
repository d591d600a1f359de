//! Customer (account balance) repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use mercado_core::{CustomerId, Money, UserId};

use super::RepositoryError;
use crate::models::Customer;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    user_id: i32,
    balance: Decimal,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: CustomerId::new(row.id),
            user_id: UserId::new(row.user_id),
            balance: Money::from_stored(row.balance),
        }
    }
}

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the customer owned by a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: UserId) -> Result<Option<Customer>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r"
            SELECT id, user_id, balance
            FROM mercado.customer
            WHERE user_id = $1
            ",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Customer::from))
    }

    /// Add `amount` (which may be negative) to a user's balance in one
    /// statement and return the new balance.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no customer.
    /// Returns `RepositoryError::CheckViolation` if the balance would go negative.
    /// Returns `RepositoryError::NumericOverflow` if the balance would not fit.
    pub async fn add_balance(
        &self,
        user_id: UserId,
        amount: Decimal,
    ) -> Result<Money, RepositoryError> {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r"
            UPDATE mercado.customer
            SET balance = balance + $1
            WHERE user_id = $2
            RETURNING balance
            ",
        )
        .bind(amount)
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::classify)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(Money::from_stored(balance))
    }
}

/// Create a zero-balance customer for a user inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the user already has a customer.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(conn: &mut PgConnection, user_id: UserId) -> Result<Customer, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r"
        INSERT INTO mercado.customer (user_id)
        VALUES ($1)
        RETURNING id, user_id, balance
        ",
    )
    .bind(user_id.as_i32())
    .fetch_one(conn)
    .await
    .map_err(RepositoryError::classify)?;

    Ok(Customer::from(row))
}

/// Read and row-lock a user's customer until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_by_user(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Option<Customer>, RepositoryError> {
    let row = sqlx::query_as::<_, CustomerRow>(
        r"
        SELECT id, user_id, balance
        FROM mercado.customer
        WHERE user_id = $1
        FOR UPDATE
        ",
    )
    .bind(user_id.as_i32())
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Customer::from))
}

/// Overwrite a locked customer's balance.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the customer doesn't exist.
/// Returns `RepositoryError::CheckViolation` if `balance` is negative.
pub async fn set_balance(
    conn: &mut PgConnection,
    id: CustomerId,
    balance: Money,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE mercado.customer
        SET balance = $1
        WHERE id = $2
        ",
    )
    .bind(balance.amount())
    .bind(id.as_i32())
    .execute(conn)
    .await
    .map_err(RepositoryError::classify)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

/// Delete a user's customer (and, by cascade, its transactions) inside an
/// open transaction.
///
/// Returns `true` if a customer existed.
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
        DELETE FROM mercado.customer
        WHERE user_id = $1
        ",
    )
    .bind(user_id.as_i32())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}
