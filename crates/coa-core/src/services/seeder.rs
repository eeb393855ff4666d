// ============================================================================
// COA Core - Seeder / Hierarchy Linker
// File: crates/coa-core/src/services/seeder.rs
// ============================================================================
//! Turns an ordered flat seed batch into a linked hierarchy.
//!
//! Seed documents list accounts in document order with levels interleaved
//! (depth-first), and carry no parent references: parent ids do not exist
//! until the batch is stored. The seeder inserts the whole batch, then
//! walks it a second time to point every non-root at the nearest preceding
//! row one level up.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use coa_shared::constants::ROOT_LEVEL;

use crate::domain::{Account, NewAccount, SeedRow};
use crate::error::DomainError;
use crate::repositories::AccountStore;

/// An entry the second pass could not link, with the reason.
#[derive(Debug, Clone)]
pub struct LinkFailure {
    pub code: String,
    pub reason: String,
}

/// Result of a seed run. `accounts` reflects the parent links that were
/// actually persisted; entries that stayed unlinked are listed with their
/// reasons instead of aborting the run at the first failure.
#[derive(Debug)]
pub struct SeedOutcome {
    pub accounts: Vec<Account>,
    pub unlinked: Vec<LinkFailure>,
}

/// For each row, the index of its parent row: the nearest preceding row
/// whose level is exactly one less. Roots get `None`; so does any
/// malformed row with no preceding candidate.
///
/// This leans on well-formed depth-first seed ordering. It is not a
/// general tree repair: out-of-order input links to whatever precedes it.
pub fn link_parent_indices(levels: &[i32]) -> Vec<Option<usize>> {
    let mut links = vec![None; levels.len()];
    for (i, &level) in levels.iter().enumerate() {
        if level <= ROOT_LEVEL {
            continue;
        }
        links[i] = (0..i).rev().find(|&j| levels[j] == level - 1);
    }
    links
}

pub struct Seeder<S: AccountStore> {
    store: Arc<S>,
}

impl<S: AccountStore> Seeder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Stores `rows` and links the hierarchy.
    ///
    /// The batch insert is atomic, but the link pass necessarily runs
    /// after it (ids are unknown before insertion), so a crash between the
    /// two leaves a stored-but-unlinked tail. Rows the link pass cannot
    /// handle are collected into the outcome rather than failing the rest.
    pub async fn seed(&self, rows: Vec<SeedRow>) -> Result<SeedOutcome, DomainError> {
        for row in &rows {
            row.validate()
                .map_err(|e| DomainError::Validation(format!("seed row {}: {e}", row.code)))?;
        }

        let levels: Vec<i32> = rows.iter().map(|r| r.level).collect();
        let batch: Vec<NewAccount> = rows
            .into_iter()
            .map(|r| NewAccount::new(r.code, r.name, r.account_type, r.level))
            .collect();

        info!(rows = batch.len(), "seeding chart of accounts");
        let mut accounts = self.store.bulk_insert(batch).await?;

        let links = link_parent_indices(&levels);
        let mut unlinked = Vec::new();

        for (i, link) in links.iter().enumerate() {
            match link {
                Some(parent_index) => {
                    let parent_id = accounts[*parent_index].id;
                    match self.store.update_parent(accounts[i].id, Some(parent_id)).await {
                        Ok(()) => accounts[i].parent_id = Some(parent_id),
                        Err(e) => {
                            warn!(code = %accounts[i].code, error = %e, "failed to persist parent link");
                            unlinked.push(LinkFailure {
                                code: accounts[i].code.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                None if levels[i] > ROOT_LEVEL => {
                    warn!(code = %accounts[i].code, level = levels[i], "no preceding parent row");
                    unlinked.push(LinkFailure {
                        code: accounts[i].code.clone(),
                        reason: format!("no preceding row at level {}", levels[i] - 1),
                    });
                }
                None => {}
            }
        }

        info!(
            linked = accounts.len() - unlinked.len(),
            unlinked = unlinked.len(),
            "seed complete"
        );
        Ok(SeedOutcome { accounts, unlinked })
    }
}
