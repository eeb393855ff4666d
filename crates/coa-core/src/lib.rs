//! # COA Core
//!
//! Domain entities, services, and the account-store port for the
//! hierarchical Chart of Accounts.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
