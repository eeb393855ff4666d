// ============================================================================
// COA Core - Tree Builder
// File: crates/coa-core/src/services/tree_builder.rs
// ============================================================================
//! Reconstructs the account forest from a flat batch.

use std::collections::HashMap;

use tracing::warn;

use coa_shared::types::EntityId;

use crate::domain::{Account, AccountNode, AccountTree};

/// Builds the forest of level-1 roots from an unordered flat batch.
///
/// Accounts are indexed by id, adjacency is tracked by input position, and
/// nodes are assembled in a single visit each: O(n) time and space, and
/// deterministic output order given deterministic input order. Roots and
/// children keep the input order; nothing is re-sorted.
///
/// Accounts whose `parent_id` does not resolve inside the batch are
/// returned in [`AccountTree::orphans`] (and logged) instead of being
/// silently dropped. Accounts trapped in a parent cycle can never hang off
/// a root, so they end up in `orphans` as well; no input account is lost.
pub fn build_tree(flat: Vec<Account>) -> AccountTree {
    let index_by_id: HashMap<EntityId, usize> = flat
        .iter()
        .enumerate()
        .map(|(i, account)| (account.id, i))
        .collect();

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut root_indices = Vec::new();
    let mut orphan_indices = Vec::new();

    for (i, account) in flat.iter().enumerate() {
        match account.parent_id {
            None => root_indices.push(i),
            Some(parent_id) => match index_by_id.get(&parent_id) {
                Some(&parent_index) => children_of[parent_index].push(i),
                None => orphan_indices.push(i),
            },
        }
    }

    // Each slot is taken exactly once while assembling.
    let mut slots: Vec<Option<Account>> = flat.into_iter().map(Some).collect();

    fn assemble(
        index: usize,
        slots: &mut [Option<Account>],
        children_of: &[Vec<usize>],
    ) -> Option<AccountNode> {
        let account = slots[index].take()?;
        let children = children_of[index]
            .iter()
            .filter_map(|&child| assemble(child, slots, children_of))
            .collect();
        Some(AccountNode { account, children })
    }

    let roots: Vec<AccountNode> = root_indices
        .iter()
        .filter_map(|&i| assemble(i, &mut slots, &children_of))
        .collect();

    let mut orphans: Vec<Account> = orphan_indices
        .iter()
        .filter_map(|&i| slots[i].take())
        .collect();
    // Whatever is still unclaimed hangs off an orphan or sits in a cycle.
    orphans.extend(slots.iter_mut().filter_map(Option::take));

    if !orphans.is_empty() {
        warn!(
            count = orphans.len(),
            "accounts with unresolved parents excluded from the tree"
        );
    }

    AccountTree { roots, orphans }
}
