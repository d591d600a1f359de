//! Unit counts: purchase quantities and stock levels.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`] or [`Stock`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// A purchase quantity of zero or less.
    #[error("quantity must be a positive integer")]
    NotPositive,
    /// A stock level below zero.
    #[error("stock cannot be negative")]
    NegativeStock,
    /// The value does not fit in a 32-bit column.
    #[error("value is too large")]
    OutOfRange,
    /// The value is not an integer or a string holding one.
    #[error("value must be an integer")]
    NotInteger,
}

/// Read a JSON integer, or a string holding one, as an untrusted count.
fn parse_count(value: &serde_json::Value) -> Result<i64, QuantityError> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().ok_or(if n.is_u64() {
            QuantityError::OutOfRange
        } else {
            QuantityError::NotInteger
        }),
        serde_json::Value::String(s) => s.trim().parse().map_err(|_| QuantityError::NotInteger),
        _ => Err(QuantityError::NotInteger),
    }
}

/// A positive number of units requested in a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(i32);

impl Quantity {
    /// Construct a quantity from an untrusted integer.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotPositive`] for zero or negative values and
    /// [`QuantityError::OutOfRange`] for values beyond `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value <= 0 {
            return Err(QuantityError::NotPositive);
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::OutOfRange)
    }

    /// Read a quantity from a JSON integer or numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotInteger`] for anything else, plus the
    /// errors of [`Quantity::new`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self, QuantityError> {
        Self::new(parse_count(value)?)
    }

    /// The quantity as stored in the `quantity` column.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Units of a product on hand. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stock(i32);

impl Stock {
    /// Construct a stock level from an untrusted integer.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NegativeStock`] for negative values and
    /// [`QuantityError::OutOfRange`] for values beyond `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 0 {
            return Err(QuantityError::NegativeStock);
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::OutOfRange)
    }

    /// Read a stock level from a JSON integer or numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotInteger`] for anything else, plus the
    /// errors of [`Stock::new`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self, QuantityError> {
        Self::new(parse_count(value)?)
    }

    /// Wrap a value read from the `stock` column (guarded by a CHECK constraint).
    #[must_use]
    pub const fn from_stored(value: i32) -> Self {
        Self(value)
    }

    /// The stock level as stored in the `stock` column.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Units left after taking `quantity`, or `None` if there are not enough.
    #[must_use]
    pub const fn take(self, quantity: Quantity) -> Option<Self> {
        if self.0 < quantity.0 {
            None
        } else {
            Some(Self(self.0 - quantity.0))
        }
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_quantity_must_be_positive() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::new(3).map(Quantity::get), Ok(3));
    }

    #[test]
    fn test_quantity_out_of_range() {
        assert_eq!(
            Quantity::new(i64::from(i32::MAX) + 1),
            Err(QuantityError::OutOfRange)
        );
    }

    #[test]
    fn test_stock_allows_zero() {
        assert_eq!(Stock::new(0).map(Stock::get), Ok(0));
        assert_eq!(Stock::new(-1), Err(QuantityError::NegativeStock));
    }

    #[test]
    fn test_stock_take() {
        let stock = Stock::from_stored(5);
        let three = Quantity::new(3).expect("positive");
        let after = stock.take(three).expect("enough stock");
        assert_eq!(after.get(), 2);
        assert_eq!(after.take(three), None);
    }

    #[test]
    fn test_take_everything() {
        let stock = Stock::from_stored(2);
        let two = Quantity::new(2).expect("positive");
        assert_eq!(stock.take(two).map(Stock::get), Some(0));
    }

    #[test]
    fn test_from_value_accepts_integers_and_numeric_strings() {
        assert_eq!(Quantity::from_value(&json!(3)).map(Quantity::get), Ok(3));
        assert_eq!(Quantity::from_value(&json!(" 4 ")).map(Quantity::get), Ok(4));
        assert_eq!(Stock::from_value(&json!("0")).map(Stock::get), Ok(0));
    }

    #[test]
    fn test_from_value_rejects_non_integers() {
        for value in [json!(1.5), json!("dois"), json!(null), json!(true), json!([])] {
            assert_eq!(Quantity::from_value(&value), Err(QuantityError::NotInteger));
        }
        assert_eq!(Stock::from_value(&json!(-1)), Err(QuantityError::NegativeStock));
        assert_eq!(
            Quantity::from_value(&json!(u64::MAX)),
            Err(QuantityError::OutOfRange)
        );
    }
}
