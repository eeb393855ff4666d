//! PostgreSQL repository implementations

pub mod account_store_impl;

pub use account_store_impl::PgAccountStore;
