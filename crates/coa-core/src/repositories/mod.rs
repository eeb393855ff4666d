//! Account store port and reference implementation

pub mod account_store;
pub mod memory;

pub use account_store::AccountStore;
pub use memory::MemoryAccountStore;
