//! Purchase evaluation.
//!
//! [`PurchaseQuote::evaluate`] is the whole decision of whether a purchase may
//! proceed. The storefront calls it with values read under row locks and
//! writes back exactly what it returns, so the balance and stock invariants
//! are enforced here and nowhere else.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{Money, Quantity, Stock};

/// Reasons a purchase is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The customer's balance is below the purchase total.
    #[error("insufficient funds: balance {balance}, total {total}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: Money,
        /// Price of the purchase.
        total: Decimal,
    },

    /// The product has fewer units than requested.
    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock {
        /// Units on hand.
        available: Stock,
        /// Units requested.
        requested: Quantity,
    },
}

/// The accepted outcome of a purchase: what to record and what to write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    /// Units bought.
    pub quantity: Quantity,
    /// `unit_price * quantity`, fixed at purchase time.
    pub total: Money,
    /// Customer balance after the debit.
    pub balance_after: Money,
    /// Product stock after the decrement.
    pub stock_after: Stock,
}

impl PurchaseQuote {
    /// Decide whether `quantity` units at `unit_price` can be bought with
    /// `balance` from `stock` units on hand.
    ///
    /// Funds are checked before stock, so a purchase that fails both reports
    /// [`PurchaseError::InsufficientFunds`].
    ///
    /// # Errors
    ///
    /// Returns [`PurchaseError::InsufficientFunds`] if `balance < total` and
    /// [`PurchaseError::InsufficientStock`] if `stock < quantity`.
    pub fn evaluate(
        balance: Money,
        unit_price: Money,
        stock: Stock,
        quantity: Quantity,
    ) -> Result<Self, PurchaseError> {
        // An overflowing product is certainly more than any storable balance.
        let total = unit_price
            .amount()
            .checked_mul(Decimal::from(quantity.get()))
            .unwrap_or(Decimal::MAX);

        if balance.amount() < total {
            return Err(PurchaseError::InsufficientFunds { balance, total });
        }

        let stock_after = stock
            .take(quantity)
            .ok_or(PurchaseError::InsufficientStock {
                available: stock,
                requested: quantity,
            })?;

        // total <= balance < 10^8 with scale 2, so both fit in NUMERIC(10, 2).
        let total = Money::from_stored(total);
        let balance_after = Money::from_stored(balance.amount() - total.amount());

        Ok(Self {
            quantity,
            total,
            balance_after,
            stock_after,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn money(s: &str) -> Money {
        Money::new(Decimal::from_str(s).unwrap()).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[test]
    fn test_successful_purchase() {
        let quote = PurchaseQuote::evaluate(
            money("500.00"),
            money("100.00"),
            Stock::from_stored(5),
            qty(3),
        )
        .unwrap();

        assert_eq!(quote.total.to_string(), "300.00");
        assert_eq!(quote.balance_after.to_string(), "200.00");
        assert_eq!(quote.stock_after.get(), 2);
    }

    #[test]
    fn test_exact_balance_and_stock() {
        let quote = PurchaseQuote::evaluate(
            money("30.00"),
            money("10.00"),
            Stock::from_stored(3),
            qty(3),
        )
        .unwrap();

        assert_eq!(quote.balance_after, Money::ZERO);
        assert_eq!(quote.stock_after.get(), 0);
    }

    #[test]
    fn test_insufficient_funds() {
        let err = PurchaseQuote::evaluate(
            money("99.99"),
            money("100.00"),
            Stock::from_stored(5),
            qty(1),
        )
        .unwrap_err();

        assert!(matches!(err, PurchaseError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_insufficient_stock() {
        let err = PurchaseQuote::evaluate(
            money("1000.00"),
            money("100.00"),
            Stock::from_stored(2),
            qty(3),
        )
        .unwrap_err();

        assert_eq!(
            err,
            PurchaseError::InsufficientStock {
                available: Stock::from_stored(2),
                requested: qty(3),
            }
        );
    }

    #[test]
    fn test_funds_checked_before_stock() {
        let err = PurchaseQuote::evaluate(
            money("1.00"),
            money("100.00"),
            Stock::from_stored(0),
            qty(3),
        )
        .unwrap_err();

        assert!(matches!(err, PurchaseError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_free_product_only_needs_stock() {
        let quote =
            PurchaseQuote::evaluate(Money::ZERO, Money::ZERO, Stock::from_stored(1), qty(1))
                .unwrap();
        assert_eq!(quote.total, Money::ZERO);
        assert_eq!(quote.stock_after.get(), 0);
    }

    #[test]
    fn test_huge_quantity_is_insufficient_funds() {
        let err = PurchaseQuote::evaluate(
            money("99999999.99"),
            money("99999999.99"),
            Stock::from_stored(i32::MAX),
            qty(i64::from(i32::MAX)),
        )
        .unwrap_err();

        assert!(matches!(err, PurchaseError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_invariant_holds_across_grid() {
        let price = money("12.34");
        for balance_cents in [0_i64, 1233, 1234, 5000, 10_000] {
            for stock in 0..4 {
                for n in 1..4 {
                    let balance = Money::new(Decimal::new(balance_cents, 2)).unwrap();
                    let result =
                        PurchaseQuote::evaluate(balance, price, Stock::from_stored(stock), qty(n));
                    let total = price.amount() * Decimal::from(n);
                    let allowed = balance.amount() >= total && i64::from(stock) >= n;
                    assert_eq!(result.is_ok(), allowed);
                    if let Ok(quote) = result {
                        assert_eq!(quote.balance_after.amount(), balance.amount() - total);
                        assert_eq!(i64::from(quote.stock_after.get()), i64::from(stock) - n);
                    }
                }
            }
        }
    }
}
