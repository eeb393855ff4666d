// ============================================================================
// COA Infrastructure - Seed Loader
// File: crates/coa-infrastructure/src/seed/loader.rs
// Description: Parses flat COA rows from a CSV seed document
// ============================================================================
//! Reads `code,name,type,level` rows. Rows arrive in document order;
//! parent links are derived later by the seeder, so the document carries
//! none.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;
use validator::Validate;

use coa_core::domain::SeedRow;
use coa_core::error::DomainError;

/// Embedded sample chart, mirroring the document shipped with the
/// application.
const DEFAULT_COA_CSV: &str = include_str!("data/coa.csv");

/// Parses and validates seed rows from any reader. The first line must be
/// the `code,name,type,level` header. Malformed or invalid rows fail the
/// whole load, reported with their line number.
pub fn load_rows<R: Read>(reader: R) -> Result<Vec<SeedRow>, DomainError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();

    for (i, record) in csv_reader.deserialize::<SeedRow>().enumerate() {
        // +2: one for the header line, one for 1-based numbering.
        let line = i + 2;
        let row = record
            .map_err(|e| DomainError::Validation(format!("seed line {line}: {e}")))?;
        row.validate()
            .map_err(|e| DomainError::Validation(format!("seed line {line}: {e}")))?;
        rows.push(row);
    }

    info!(rows = rows.len(), "seed document loaded");
    Ok(rows)
}

pub fn load_rows_from_path(path: impl AsRef<Path>) -> Result<Vec<SeedRow>, DomainError> {
    let file = File::open(path.as_ref()).map_err(|e| {
        DomainError::Validation(format!(
            "failed to read seed file {}: {e}",
            path.as_ref().display()
        ))
    })?;
    load_rows(file)
}

/// Rows of the embedded sample chart.
pub fn default_rows() -> Result<Vec<SeedRow>, DomainError> {
    load_rows(DEFAULT_COA_CSV.as_bytes())
}
