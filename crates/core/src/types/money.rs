//! Monetary amounts with fixed two-place decimal precision.
//!
//! Balances, prices and totals live in `NUMERIC(10, 2)` columns, so every
//! [`Money`] value carries scale 2 and fewer than eight integer digits. On the
//! wire they are strings (`"200.00"`), never floats.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("amount must have at most {max} decimal places")]
    TooManyDecimalPlaces {
        /// Maximum allowed decimal places.
        max: u32,
    },
    /// The amount does not fit in ten digits.
    #[error("amount must have at most {max} digits")]
    TooLarge {
        /// Maximum allowed digits in total.
        max: u32,
    },
}

/// Errors that can occur when reading a loosely-typed amount from a request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The value is missing, not a number, or not a numeric string.
    #[error("amount must be numeric")]
    NotNumeric,
    /// The value is numeric but does not fit in ten digits.
    #[error("amount must have at most {max} digits", max = Money::MAX_DIGITS)]
    TooLarge,
}

/// A non-negative amount of money with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "Decimal", try_from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Decimal places carried by every amount.
    pub const SCALE: u32 = 2;

    /// Total digits allowed (integer plus fractional), as in `NUMERIC(10, 2)`.
    pub const MAX_DIGITS: u32 = 10;

    /// Zero, with scale 2.
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Exclusive upper bound on the absolute value of an amount (10^8).
    fn limit() -> Decimal {
        Decimal::from(100_000_000_i64)
    }

    /// Construct an amount, rejecting anything a `NUMERIC(10, 2)` column would
    /// not hold exactly.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError`] if the amount is negative, has more than two
    /// decimal places, or has more than ten digits.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }

        if amount.normalize().scale() > Self::SCALE {
            return Err(MoneyError::TooManyDecimalPlaces { max: Self::SCALE });
        }

        if amount >= Self::limit() {
            return Err(MoneyError::TooLarge {
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self::rescaled(amount))
    }

    /// Wrap a value read from a `NUMERIC(10, 2)` column.
    #[must_use]
    pub fn from_stored(amount: Decimal) -> Self {
        Self::rescaled(amount)
    }

    fn rescaled(mut amount: Decimal) -> Self {
        amount.rescale(Self::SCALE);
        Self(amount)
    }

    /// The underlying decimal, always with scale 2.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Read a top-up or price amount from a JSON number or numeric string.
    ///
    /// The value is rounded to two places with banker's rounding (what a
    /// `NUMERIC(10, 2)` column does on insert). Negative values are accepted;
    /// callers decide whether a sign is meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotNumeric`] for `null`, booleans, arrays,
    /// objects, and strings that do not parse as a decimal, and
    /// [`AmountError::TooLarge`] for values with more than eight integer digits.
    pub fn parse_amount(value: &serde_json::Value) -> Result<Decimal, AmountError> {
        let mut rounded = Self::parse_value(value)?.round_dp(Self::SCALE);
        if rounded.abs() >= Self::limit() {
            return Err(AmountError::TooLarge);
        }
        rounded.rescale(Self::SCALE);
        Ok(rounded)
    }

    /// Read a JSON number or numeric string as an exact decimal, without
    /// rounding or range checks. Pair with [`Money::new`] to validate.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotNumeric`] for anything that is not a number
    /// or a string holding one.
    pub fn parse_value(value: &serde_json::Value) -> Result<Decimal, AmountError> {
        match value {
            serde_json::Value::Number(n) => parse_decimal(&n.to_string()),
            serde_json::Value::String(s) => parse_decimal(s.trim()),
            _ => None,
        }
        .ok_or(AmountError::NotNumeric)
    }
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self::from_stored)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
