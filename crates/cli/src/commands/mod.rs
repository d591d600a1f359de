//! CLI commands.

pub mod api;
pub mod client;
pub mod migrate;
pub mod session;
