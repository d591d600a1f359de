//! Customer (account) domain types.

use mercado_core::{CustomerId, Money, UserId};

/// The balance-holding profile owned by exactly one user.
#[derive(Debug, Clone, Copy)]
pub struct Customer {
    /// Customer ID.
    pub id: CustomerId,
    /// Owning user.
    pub user_id: UserId,
    /// Current balance, never negative.
    pub balance: Money,
}
