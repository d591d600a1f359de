//! Product catalog: creation and filtered listing.

use sqlx::PgPool;
use thiserror::Error;

use mercado_core::listing::{Pagination, ProductFilter, ProductSort};
use mercado_core::{Money, MoneyError, QuantityError, Stock};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::{NewProduct, Product};

/// Errors raised by catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Name missing, blank or too long.
    #[error("{0}")]
    InvalidName(String),

    /// Price missing, not numeric, negative or not storable.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Stock missing, not an integer or negative.
    #[error("invalid stock: {0}")]
    InvalidStock(#[from] QuantityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<MoneyError> for CatalogError {
    fn from(err: MoneyError) -> Self {
        Self::InvalidPrice(err.to_string())
    }
}

/// Catalog operations.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// Validate and insert a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidName`, `CatalogError::InvalidPrice` or
    /// `CatalogError::InvalidStock` for bad input.
    pub async fn create_product(
        &self,
        name: Option<&str>,
        price: Option<&serde_json::Value>,
        stock: Option<&serde_json::Value>,
    ) -> Result<Product, CatalogError> {
        let product = validate_new_product(name, price, stock)?;
        let product = self.products.create(&product).await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// One page of the catalog and the number of products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        sort: ProductSort,
        page: &Pagination,
    ) -> Result<(Vec<Product>, i64), CatalogError> {
        Ok(self.products.list(filter, sort, page).await?)
    }
}

fn validate_new_product(
    name: Option<&str>,
    price: Option<&serde_json::Value>,
    stock: Option<&serde_json::Value>,
) -> Result<NewProduct, CatalogError> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(CatalogError::InvalidName(
            "O nome do produto é obrigatório.".to_string(),
        ));
    }
    if name.chars().count() > NewProduct::MAX_NAME_LENGTH {
        return Err(CatalogError::InvalidName(format!(
            "O nome do produto deve ter no máximo {} caracteres.",
            NewProduct::MAX_NAME_LENGTH
        )));
    }

    let price = price
        .ok_or_else(|| CatalogError::InvalidPrice("price is required".to_string()))
        .and_then(|value| {
            Money::parse_value(value).map_err(|e| CatalogError::InvalidPrice(e.to_string()))
        })
        .and_then(|amount| Ok(Money::new(amount)?))?;

    let stock = Stock::from_value(stock.unwrap_or(&serde_json::Value::Null))?;

    Ok(NewProduct {
        name: name.to_string(),
        price,
        stock,
    })
}
