//! Product (catalog) repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use mercado_core::listing::{Pagination, ProductFilter, ProductSort, contains_pattern};
use mercado_core::{Money, ProductId, Stock};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    price: Decimal,
    stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            price: Money::from_stored(row.price),
            stock: Stock::from_stored(row.stock),
        }
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::CheckViolation` if a stored constraint rejects it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO mercado.product (name, price, stock)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, stock
            ",
        )
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.stock.get())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::classify)?;

        Ok(Product::from(row))
    }

    /// One page of the filtered, sorted catalog plus the filtered total.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: &Pagination,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM mercado.product");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, name, price, stock FROM mercado.product");
        push_filter(&mut query, filter);
        query.push(order_by(sort));
        query.push(" LIMIT ");
        query.push_bind(page.limit());
        query.push(" OFFSET ");
        query.push_bind(page.offset());

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok((rows.into_iter().map(Product::from).collect(), total))
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    query.push(" WHERE TRUE");
    if let Some(name) = &filter.name {
        query.push(" AND name ILIKE ");
        query.push_bind(contains_pattern(name));
    }
    if let Some(max_price) = filter.max_price {
        query.push(" AND price <= ");
        query.push_bind(max_price);
    }
}

const fn order_by(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Id => " ORDER BY id",
        ProductSort::Stock => " ORDER BY stock, id",
        ProductSort::Price => " ORDER BY price, id",
    }
}

/// Read and row-lock a product until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Product>, RepositoryError> {
    let row = sqlx::query_as::<_, ProductRow>(
        r"
        SELECT id, name, price, stock
        FROM mercado.product
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id.as_i32())
    .fetch_optional(conn)
    .await?;

    Ok(row.map(Product::from))
}

/// Overwrite a locked product's stock.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the product doesn't exist.
/// Returns `RepositoryError::CheckViolation` if `stock` is negative.
pub async fn set_stock(
    conn: &mut PgConnection,
    id: ProductId,
    stock: Stock,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE mercado.product
        SET stock = $1
        WHERE id = $2
        ",
    )
    .bind(stock.get())
    .bind(id.as_i32())
    .execute(conn)
    .await
    .map_err(RepositoryError::classify)?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_shape() {
        let filter = ProductFilter {
            name: Some("caneta".to_owned()),
            max_price: Some(Decimal::from(150)),
        };
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT id, name, price, stock FROM mercado.product");
        push_filter(&mut query, &filter);
        query.push(order_by(ProductSort::Price));

        assert_eq!(
            query.sql(),
            "SELECT id, name, price, stock FROM mercado.product WHERE TRUE \
             AND name ILIKE $1 AND price <= $2 ORDER BY price, id"
        );
    }

    #[test]
    fn test_unfiltered_query_has_no_binds() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM mercado.product");
        push_filter(&mut query, &ProductFilter::default());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM mercado.product WHERE TRUE");
    }
}
