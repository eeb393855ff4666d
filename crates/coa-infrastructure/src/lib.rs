//! # COA Infrastructure
//!
//! Database adapter and seed-document loading for the Chart of Accounts.

pub mod database;
pub mod seed;

pub use database::{create_pool, PgAccountStore};
