//! Transient tree view over flat accounts

use serde::Serialize;

use super::Account;

/// One account with its children attached. Built on demand by the tree
/// builder; never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AccountNode {
    #[serde(flatten)]
    pub account: Account,
    pub children: Vec<AccountNode>,
}

/// The reconstructed forest. Accounts whose parent id did not resolve in
/// the input batch are surfaced in `orphans` instead of being dropped.
#[derive(Debug, Clone, Serialize)]
pub struct AccountTree {
    pub roots: Vec<AccountNode>,
    pub orphans: Vec<Account>,
}

impl AccountTree {
    /// Depth-first traversal over all attached accounts, roots first in
    /// input order. Orphans are not included.
    pub fn flatten(&self) -> Vec<&Account> {
        fn walk<'a>(node: &'a AccountNode, out: &mut Vec<&'a Account>) {
            out.push(&node.account);
            for child in &node.children {
                walk(child, out);
            }
        }

        let mut out = Vec::new();
        for root in &self.roots {
            walk(root, &mut out);
        }
        out
    }
}
