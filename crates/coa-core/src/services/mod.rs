//! # COA Core - Services Module
//!
//! Tree reconstruction, code numbering, account lookup/allocation, and
//! seed linking.

pub mod coa_service;
pub mod numbering;
pub mod seeder;
pub mod tree_builder;

pub use coa_service::CoaService;
pub use seeder::{LinkFailure, SeedOutcome, Seeder};
pub use tree_builder::build_tree;
