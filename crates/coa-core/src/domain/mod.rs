//! # COA Core - Domain Module
//!
//! Domain entities for the Chart of Accounts.

pub mod account;
pub mod descriptor;
pub mod seed;
pub mod tree;

// Re-export all entities
pub use account::{Account, NewAccount};
pub use descriptor::ChildDescriptor;
pub use seed::SeedRow;
pub use tree::{AccountNode, AccountTree};
