//! Domain models for the storefront.
//!
//! These are validated domain objects, separate from the row types the
//! repositories decode and from the JSON shapes the routes serialize.

pub mod customer;
pub mod product;
pub mod transaction;
pub mod user;

pub use customer::Customer;
pub use product::{NewProduct, Product};
pub use transaction::{Transaction, TransactionRecord};
pub use user::User;
