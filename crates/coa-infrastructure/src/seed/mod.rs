//! Seed-document ingestion

pub mod loader;

pub use loader::{default_rows, load_rows, load_rows_from_path};
