// ============================================================================
// COA Core - In-Memory Account Store
// File: crates/coa-core/src/repositories/memory.rs
// Description: Mutex-backed store used by tests and as reference behavior
// ============================================================================

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use coa_shared::types::{new_id, EntityId};
use coa_shared::utils::name_matches;

use crate::domain::{Account, NewAccount};
use crate::error::DomainError;
use crate::repositories::AccountStore;

/// In-memory [`AccountStore`]. Check-then-insert runs under a single lock,
/// so code-uniqueness behaves like the unique index of the SQL adapter.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Account>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn materialize(account: NewAccount) -> Account {
        Account {
            id: new_id(),
            code: account.code,
            name: account.name,
            account_type: account.account_type,
            level: account.level,
            parent_id: account.parent_id,
            created_by: account.created_by,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn unique_by_name<'a, I>(matches: I, name: &str) -> Result<Option<Account>, DomainError>
    where
        I: Iterator<Item = &'a Account>,
    {
        let mut found: Vec<&Account> = matches.collect();
        if found.len() > 1 {
            return Err(DomainError::AmbiguousName(name.to_string()));
        }
        Ok(found.pop().cloned())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        let mut accounts = self.lock().clone();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Account>, DomainError> {
        Ok(self.lock().iter().find(|a| a.code == code).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.lock();
        Self::unique_by_name(accounts.iter().filter(|a| name_matches(&a.name, name)), name)
    }

    async fn find_by_name_and_level(
        &self,
        name: &str,
        level: i32,
    ) -> Result<Option<Account>, DomainError> {
        let accounts = self.lock();
        Self::unique_by_name(
            accounts
                .iter()
                .filter(|a| a.level == level && name_matches(&a.name, name)),
            name,
        )
    }

    async fn find_by_parent_id(
        &self,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<Account>, DomainError> {
        let mut children: Vec<Account> = self
            .lock()
            .iter()
            .filter(|a| a.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(children)
    }

    async fn find_child_by_name(
        &self,
        parent_id: EntityId,
        name: &str,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError> {
        Ok(self
            .lock()
            .iter()
            .filter(|a| {
                a.parent_id == Some(parent_id)
                    && level.map_or(true, |l| a.level == l)
                    && name_matches(&a.name, name)
            })
            .max_by(|a, b| a.code.cmp(&b.code))
            .cloned())
    }

    async fn find_top_sibling_by_parent(
        &self,
        parent_id: EntityId,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError> {
        Ok(self
            .lock()
            .iter()
            .filter(|a| a.parent_id == Some(parent_id) && level.map_or(true, |l| a.level == l))
            .max_by(|a, b| a.code.cmp(&b.code))
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DomainError> {
        let mut accounts = self.lock();
        if accounts.iter().any(|a| a.code == account.code) {
            return Err(DomainError::DuplicateCode(account.code));
        }
        let stored = Self::materialize(account);
        accounts.push(stored.clone());
        Ok(stored)
    }

    async fn bulk_insert(&self, batch: Vec<NewAccount>) -> Result<Vec<Account>, DomainError> {
        let mut accounts = self.lock();
        for (i, row) in batch.iter().enumerate() {
            let clashes_existing = accounts.iter().any(|a| a.code == row.code);
            let clashes_batch = batch[..i].iter().any(|b| b.code == row.code);
            if clashes_existing || clashes_batch {
                return Err(DomainError::DuplicateCode(row.code.clone()));
            }
        }
        let stored: Vec<Account> = batch.into_iter().map(Self::materialize).collect();
        accounts.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update_parent(
        &self,
        id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<(), DomainError> {
        let mut accounts = self.lock();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| DomainError::AccountNotFound(id.to_string()))?;
        account.parent_id = parent_id;
        account.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(code: &str, name: &str, level: i32) -> NewAccount {
        NewAccount::new(code.to_string(), name.to_string(), "asset".to_string(), level)
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_code() {
        let store = MemoryAccountStore::new();
        store.insert(new_account("01", "Assets", 1)).await.unwrap();

        let err = store.insert(new_account("01", "Other", 1)).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateCode(code) if code == "01"));
    }

    #[tokio::test]
    async fn test_bulk_insert_rejects_clash_without_partial_write() {
        let store = MemoryAccountStore::new();
        let batch = vec![
            new_account("01", "Assets", 1),
            new_account("02", "Liabilities", 1),
            new_account("01", "Assets Again", 1),
        ];
        assert!(store.bulk_insert(batch).await.is_err());
        assert!(store.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive_and_strict_on_ambiguity() {
        let store = MemoryAccountStore::new();
        store.insert(new_account("01", "Assets", 1)).await.unwrap();
        store.insert(new_account("0100", "Cash", 2)).await.unwrap();
        store.insert(new_account("0200", "Cash", 2)).await.unwrap();

        let found = store.find_by_name("ASSETS").await.unwrap().unwrap();
        assert_eq!(found.code, "01");

        let err = store.find_by_name("cash").await.unwrap_err();
        assert!(matches!(err, DomainError::AmbiguousName(name) if name == "cash"));
    }

    #[tokio::test]
    async fn test_find_by_code_and_parent_scoping() {
        let store = MemoryAccountStore::new();
        let root = store.insert(new_account("01", "Assets", 1)).await.unwrap();
        let mut child = new_account("0100", "Current Assets", 2);
        child.parent_id = Some(root.id);
        store.insert(child).await.unwrap();

        let found = store.find_by_code("0100").await.unwrap().unwrap();
        assert_eq!(found.name, "Current Assets");
        assert!(store.find_by_code("9999").await.unwrap().is_none());

        // None selects the roots.
        let roots = store.find_by_parent_id(None).await.unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].code, "01");

        let children = store.find_by_parent_id(Some(root.id)).await.unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].code, "0100");
    }

    #[tokio::test]
    async fn test_top_sibling_orders_by_code_descending() {
        let store = MemoryAccountStore::new();
        let parent = store.insert(new_account("0100", "Current Assets", 2)).await.unwrap();
        for code in ["01000002", "01000007", "01000001"] {
            let mut child = new_account(code, &format!("Child {code}"), 3);
            child.parent_id = Some(parent.id);
            store.insert(child).await.unwrap();
        }

        let top = store
            .find_top_sibling_by_parent(parent.id, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(top.code, "01000007");
    }
}
