//! Purchase ledger repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use mercado_core::listing::{Pagination, TransactionFilter, TransactionSort, contains_pattern};
use mercado_core::{CustomerId, Money, ProductId, Quantity, TransactionId};

use super::RepositoryError;
use crate::models::{Transaction, TransactionRecord};

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i32,
    customer_id: i32,
    product_id: i32,
    quantity: i32,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TransactionRecordRow {
    #[sqlx(flatten)]
    transaction: TransactionRow,
    product_name: String,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
        })?;

        Ok(Self {
            id: TransactionId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            product_id: ProductId::new(row.product_id),
            quantity,
            total: Money::from_stored(row.total),
            created_at: row.created_at,
        })
    }
}

/// Repository for the purchase ledger.
pub struct TransactionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TransactionRepository<'a> {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of a customer's filtered, sorted purchase history plus the
    /// filtered total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored quantity is invalid.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        filter: &TransactionFilter,
        sort: TransactionSort,
        page: &Pagination,
    ) -> Result<(Vec<TransactionRecord>, i64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM mercado.transaction t \
             JOIN mercado.product p ON p.id = t.product_id",
        );
        push_filter(&mut count, customer_id, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT t.id, t.customer_id, t.product_id, t.quantity, t.total, t.created_at, \
             p.name AS product_name \
             FROM mercado.transaction t \
             JOIN mercado.product p ON p.id = t.product_id",
        );
        push_filter(&mut query, customer_id, filter);
        query.push(order_by(sort));
        query.push(" LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let rows = query
            .build_query_as::<TransactionRecordRow>()
            .fetch_all(self.pool)
            .await?;

        let records = rows
            .into_iter()
            .map(|row| {
                Ok(TransactionRecord {
                    transaction: Transaction::try_from(row.transaction)?,
                    product_name: row.product_name,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok((records, total))
    }
}

fn push_filter(
    query: &mut QueryBuilder<'_, Postgres>,
    customer_id: CustomerId,
    filter: &TransactionFilter,
) {
    query.push(" WHERE t.customer_id = ");
    query.push_bind(customer_id.as_i32());
    if let Some(name) = &filter.product_name {
        query.push(" AND p.name ILIKE ");
        query.push_bind(contains_pattern(name));
    }
    if let Some(min_quantity) = filter.min_quantity {
        query.push(" AND t.quantity >= ");
        query.push_bind(min_quantity);
    }
}

const fn order_by(sort: TransactionSort) -> &'static str {
    match sort {
        TransactionSort::Id => " ORDER BY t.id",
        TransactionSort::Date => " ORDER BY t.created_at, t.id",
        TransactionSort::Total => " ORDER BY t.total, t.id",
    }
}

/// Append a purchase to the ledger inside an open transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert(
    conn: &mut PgConnection,
    customer_id: CustomerId,
    product_id: ProductId,
    quantity: Quantity,
    total: Money,
) -> Result<Transaction, RepositoryError> {
    let row = sqlx::query_as::<_, TransactionRow>(
        r"
        INSERT INTO mercado.transaction (customer_id, product_id, quantity, total)
        VALUES ($1, $2, $3, $4)
        RETURNING id, customer_id, product_id, quantity, total, created_at
        ",
    )
    .bind(customer_id.as_i32())
    .bind(product_id.as_i32())
    .bind(quantity.get())
    .bind(total.amount())
    .fetch_one(conn)
    .await
    .map_err(RepositoryError::classify)?;

    Transaction::try_from(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_scoped_to_customer() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM mercado.transaction t");
        push_filter(
            &mut query,
            CustomerId::new(7),
            &TransactionFilter {
                product_name: None,
                min_quantity: Some(2),
            },
        );
        query.push(order_by(TransactionSort::Total));

        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM mercado.transaction t WHERE t.customer_id = $1 \
             AND t.quantity >= $2 ORDER BY t.total, t.id"
        );
    }
}
