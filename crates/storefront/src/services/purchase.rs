//! Purchases and purchase history.
//!
//! A purchase is one database transaction: the customer row is locked, then
//! the product row, the quote is evaluated against what was read, and the
//! new balance, new stock and ledger entry are written before commit. The
//! fixed lock order keeps concurrent purchases from deadlocking, and the
//! second of two competing purchases always sees the first one's writes.

use sqlx::PgPool;
use thiserror::Error;

use mercado_core::listing::{Pagination, TransactionFilter, TransactionSort};
use mercado_core::purchase::{PurchaseError as Rejection, PurchaseQuote};
use mercado_core::{ProductId, Quantity, UserId};

use crate::db::{CustomerRepository, RepositoryError, TransactionRepository};
use crate::db::{customers, products, transactions, users};
use crate::models::{Transaction, TransactionRecord};

/// Errors raised by purchase operations.
#[derive(Debug, Error)]
pub enum PurchaseError {
    /// No user with the given username.
    #[error("user not found")]
    UserNotFound,

    /// The user has no customer profile.
    #[error("customer not found")]
    CustomerNotFound,

    /// No product with the given ID.
    #[error("product not found")]
    ProductNotFound,

    /// Not enough balance or stock.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Purchase operations.
pub struct PurchaseService<'a> {
    pool: &'a PgPool,
    customers: CustomerRepository<'a>,
    transactions: TransactionRepository<'a>,
}

impl<'a> PurchaseService<'a> {
    /// Create a new purchase service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            customers: CustomerRepository::new(pool),
            transactions: TransactionRepository::new(pool),
        }
    }

    /// Buy `quantity` units of a product for the customer of `username`.
    ///
    /// Either every write happens or none does.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::UserNotFound`, `PurchaseError::CustomerNotFound`
    /// or `PurchaseError::ProductNotFound` (checked in that order), and
    /// `PurchaseError::Rejected` when funds or stock are short.
    pub async fn purchase(
        &self,
        username: &str,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<Transaction, PurchaseError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let user_id = users::find_id_by_username(&mut tx, username)
            .await?
            .ok_or(PurchaseError::UserNotFound)?;
        let customer = customers::lock_by_user(&mut tx, user_id)
            .await?
            .ok_or(PurchaseError::CustomerNotFound)?;
        let product = products::lock(&mut tx, product_id)
            .await?
            .ok_or(PurchaseError::ProductNotFound)?;

        let quote = PurchaseQuote::evaluate(customer.balance, product.price, product.stock, quantity)
            .inspect_err(|e| {
                tracing::info!(
                    customer_id = %customer.id,
                    product_id = %product.id,
                    reason = %e,
                    "Purchase rejected"
                );
            })?;

        customers::set_balance(&mut tx, customer.id, quote.balance_after).await?;
        products::set_stock(&mut tx, product.id, quote.stock_after).await?;
        let transaction =
            transactions::insert(&mut tx, customer.id, product.id, quote.quantity, quote.total)
                .await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            transaction_id = %transaction.id,
            customer_id = %customer.id,
            product_id = %product.id,
            quantity = %quote.quantity,
            total = %quote.total,
            "Purchase completed"
        );
        Ok(transaction)
    }

    /// One page of a user's purchase history and the number of entries
    /// matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `PurchaseError::CustomerNotFound` if the user has no customer.
    pub async fn history(
        &self,
        user_id: UserId,
        filter: &TransactionFilter,
        sort: TransactionSort,
        page: &Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), PurchaseError> {
        let customer = self
            .customers
            .get_by_user(user_id)
            .await?
            .ok_or(PurchaseError::CustomerNotFound)?;

        Ok(self
            .transactions
            .list_for_customer(customer.id, filter, sort, page)
            .await?)
    }
}
