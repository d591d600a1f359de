//! Mercado Core - Domain types and rules.
//!
//! This crate provides the types and business rules shared by the Mercado
//! components:
//! - `storefront` - The HTTP API (accounts, catalog, purchases)
//! - `cli` - Migrations and the command-line client
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Anything that must hold across a purchase
//! (balance and stock checks, totals) is decided here so it can be tested
//! without a database.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, usernames, emails, money and quantities
//! - [`purchase`] - Evaluation of a purchase against a balance and a stock level
//! - [`listing`] - Filters, sort orders and pagination for catalog and history listings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod listing;
pub mod purchase;
pub mod types;

pub use types::*;
