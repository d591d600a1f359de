//! Core types for Mercado.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod quantity;
pub mod username;
pub mod verification;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{AmountError, Money, MoneyError};
pub use quantity::{Quantity, QuantityError, Stock};
pub use username::{Username, UsernameError};
pub use verification::VerificationCode;
