//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, email verification, login, tokens, passwords
//! - `tokens` - JWT issuance and validation
//! - `email` - Verification code delivery over SMTP
//! - `ledger` - Balance top-ups
//! - `catalog` - Product creation and listing
//! - `purchase` - Atomic purchases and purchase history
//! - `account` - Account deletion

pub mod account;
pub mod auth;
pub mod catalog;
pub mod email;
pub mod ledger;
pub mod purchase;
pub mod tokens;

pub use account::{AccountError, DeleteOutcome};
pub use auth::{AuthError, AuthService};
pub use catalog::{CatalogError, CatalogService};
pub use email::{EmailError, EmailService};
pub use ledger::{LedgerError, LedgerService};
pub use purchase::{PurchaseError, PurchaseService};
pub use tokens::{TokenError, TokenPair, TokenService};
