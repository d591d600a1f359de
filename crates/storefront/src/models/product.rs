//! Catalog domain types.

use mercado_core::{Money, ProductId, Stock};

/// A catalog item.
#[derive(Debug, Clone)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name, 1 to 100 characters.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Units on hand.
    pub stock: Stock,
}

/// A validated product about to be inserted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    /// Display name, 1 to 100 characters.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Initial units on hand.
    pub stock: Stock,
}

impl NewProduct {
    /// Maximum length of a product name, in characters.
    pub const MAX_NAME_LENGTH: usize = 100;
}
