//! Purchase ledger domain types.

use chrono::{DateTime, Utc};

use mercado_core::{CustomerId, Money, ProductId, Quantity, TransactionId};

/// An immutable record of a completed purchase.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Buyer.
    pub customer_id: CustomerId,
    /// Product bought.
    pub product_id: ProductId,
    /// Units bought.
    pub quantity: Quantity,
    /// `quantity * unit price` at purchase time.
    pub total: Money,
    /// When the purchase committed.
    pub created_at: DateTime<Utc>,
}

/// A transaction joined with the name of the product it bought, as listed in
/// purchase history.
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    /// The ledger entry.
    pub transaction: Transaction,
    /// Current name of the purchased product.
    pub product_name: String,
}
