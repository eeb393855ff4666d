// ============================================================================
// COA Core - Chart of Accounts Service
// File: crates/coa-core/src/services/coa_service.rs
// ============================================================================
//! Lookup and allocation operations over the account store.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use coa_shared::constants::MAX_CODE_RETRIES;
use coa_shared::types::EntityId;

use crate::domain::{Account, AccountTree, ChildDescriptor, NewAccount};
use crate::error::DomainError;
use crate::repositories::AccountStore;
use crate::services::{numbering, tree_builder};

pub struct CoaService<S: AccountStore> {
    store: Arc<S>,
}

impl<S: AccountStore> CoaService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The full chart as a forest of level-1 roots.
    pub async fn find_all(&self) -> Result<AccountTree, DomainError> {
        let flat = self.store.find_all().await?;
        Ok(tree_builder::build_tree(flat))
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Account>, DomainError> {
        self.store.find_by_code(code).await
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        self.store.find_by_name(name).await
    }

    pub async fn find_by_parent_id(
        &self,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<Account>, DomainError> {
        self.store.find_by_parent_id(parent_id).await
    }

    /// The code, type, and level a new child of the named parent would
    /// receive under the leveled numbering policy. Read-only: nothing is
    /// created, and the returned descriptor carries no id.
    pub async fn next_child_code(&self, parent_name: &str) -> Result<ChildDescriptor, DomainError> {
        let parent = self
            .store
            .find_by_name(parent_name)
            .await?
            .ok_or_else(|| DomainError::ParentNotFound(parent_name.to_string()))?;

        let top_sibling = self.store.find_top_sibling_by_parent(parent.id, None).await?;
        let code = numbering::next_leveled_code(
            &parent.code,
            parent.level,
            top_sibling.as_ref().map(|a| a.code.as_str()),
        )?;

        Ok(ChildDescriptor {
            id: None,
            code,
            account_type: parent.account_type,
            level: parent.level + 1,
            parent_id: parent.id,
        })
    }

    /// The stored code and level of an existing named child. Fails with
    /// `ChildNotFound` when the parent has no such child; allocates
    /// nothing.
    pub async fn find_child_code(
        &self,
        parent_name: &str,
        child_name: &str,
    ) -> Result<ChildDescriptor, DomainError> {
        let parent = self
            .store
            .find_by_name(parent_name)
            .await?
            .ok_or_else(|| DomainError::ParentNotFound(parent_name.to_string()))?;

        let child = self
            .store
            .find_child_by_name(parent.id, child_name, None)
            .await?
            .ok_or_else(|| DomainError::ChildNotFound {
                parent: parent_name.to_string(),
                child: child_name.to_string(),
            })?;

        Ok(ChildDescriptor {
            id: Some(child.id),
            code: child.code,
            account_type: parent.account_type,
            level: child.level,
            parent_id: parent.id,
        })
    }

    /// Idempotently ensures a named child exists under a named parent,
    /// returning its descriptor in either case.
    ///
    /// Codes follow the fixed-width numbering policy. The
    /// read-max-code-then-insert sequence is not serialized across
    /// callers; instead the store's code-uniqueness guarantee turns a lost
    /// race into `DuplicateCode`, and the sequence recomputes and retries
    /// up to `MAX_CODE_RETRIES` times.
    pub async fn get_or_create_child(
        &self,
        parent_name: &str,
        child_name: &str,
        parent_level: i32,
        child_level: i32,
    ) -> Result<ChildDescriptor, DomainError> {
        // 1. Resolve the parent at its expected level
        let parent = self
            .store
            .find_by_name_and_level(parent_name, parent_level)
            .await?
            .ok_or_else(|| {
                DomainError::ParentNotFound(format!("{parent_name} (level {parent_level})"))
            })?;

        if child_level != parent.level + 1 {
            return Err(DomainError::Validation(format!(
                "child level {child_level} must be exactly one below parent level {}",
                parent.level
            )));
        }

        // 2. Return the existing child untouched if there is one
        if let Some(child) = self
            .store
            .find_child_by_name(parent.id, child_name, Some(child_level))
            .await?
        {
            return Ok(ChildDescriptor {
                id: Some(child.id),
                code: child.code,
                account_type: child.account_type,
                level: child.level,
                parent_id: parent.id,
            });
        }

        // 3. Allocate the next code and insert, retrying lost races
        for attempt in 1..=MAX_CODE_RETRIES {
            let top_sibling = self
                .store
                .find_top_sibling_by_parent(parent.id, Some(child_level))
                .await?;
            let code = numbering::next_fixed_code(
                &parent.code,
                top_sibling.as_ref().map(|a| a.code.as_str()),
            )?;

            let mut candidate = NewAccount::new(
                code.clone(),
                child_name.to_string(),
                parent.account_type.clone(),
                child_level,
            );
            candidate.parent_id = Some(parent.id);
            candidate
                .validate()
                .map_err(|e| DomainError::Validation(e.to_string()))?;

            match self.store.insert(candidate).await {
                Ok(created) => {
                    info!(code = %created.code, parent = %parent.code, "created child account");
                    return Ok(ChildDescriptor {
                        id: Some(created.id),
                        code: created.code,
                        account_type: created.account_type,
                        level: created.level,
                        parent_id: parent.id,
                    });
                }
                Err(DomainError::DuplicateCode(taken)) => {
                    warn!(code = %taken, attempt, "allocated code lost the race, recomputing");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DomainError::DuplicateCode(format!(
            "could not allocate a free code under {} after {MAX_CODE_RETRIES} attempts",
            parent.code
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use mockall::mock;

    use crate::repositories::MemoryAccountStore;

    use super::*;

    mock! {
        Store {}

        #[async_trait]
        impl AccountStore for Store {
            async fn find_all(&self) -> Result<Vec<Account>, DomainError>;
            async fn find_by_code(&self, code: &str) -> Result<Option<Account>, DomainError>;
            async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError>;
            async fn find_by_name_and_level(
                &self,
                name: &str,
                level: i32,
            ) -> Result<Option<Account>, DomainError>;
            async fn find_by_parent_id(
                &self,
                parent_id: Option<EntityId>,
            ) -> Result<Vec<Account>, DomainError>;
            async fn find_child_by_name(
                &self,
                parent_id: EntityId,
                name: &str,
                level: Option<i32>,
            ) -> Result<Option<Account>, DomainError>;
            async fn find_top_sibling_by_parent(
                &self,
                parent_id: EntityId,
                level: Option<i32>,
            ) -> Result<Option<Account>, DomainError>;
            async fn insert(&self, account: NewAccount) -> Result<Account, DomainError>;
            async fn bulk_insert(
                &self,
                accounts: Vec<NewAccount>,
            ) -> Result<Vec<Account>, DomainError>;
            async fn update_parent(
                &self,
                id: EntityId,
                parent_id: Option<EntityId>,
            ) -> Result<(), DomainError>;
        }
    }

    async fn seeded_store() -> Arc<MemoryAccountStore> {
        let store = Arc::new(MemoryAccountStore::new());
        let root = NewAccount::new(
            "01".to_string(),
            "Assets".to_string(),
            "asset".to_string(),
            1,
        );
        let root = store.insert(root).await.unwrap();

        let mut current = NewAccount::new(
            "0100".to_string(),
            "Current Assets".to_string(),
            "asset".to_string(),
            2,
        );
        current.parent_id = Some(root.id);
        store.insert(current).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_next_child_code_starts_at_one() {
        let service = CoaService::new(seeded_store().await);

        let descriptor = service.next_child_code("Current Assets").await.unwrap();
        assert_eq!(descriptor.code, "01000001");
        assert_eq!(descriptor.level, 3);
        assert_eq!(descriptor.account_type, "asset");
        assert!(descriptor.id.is_none());
    }

    #[tokio::test]
    async fn test_next_child_code_increments_top_sibling() {
        let store = seeded_store().await;
        let parent = store.find_by_name("Current Assets").await.unwrap().unwrap();
        let mut sibling = NewAccount::new(
            "01000007".to_string(),
            "Cash".to_string(),
            "asset".to_string(),
            3,
        );
        sibling.parent_id = Some(parent.id);
        store.insert(sibling).await.unwrap();

        let service = CoaService::new(store);
        let descriptor = service.next_child_code("current assets").await.unwrap();
        assert_eq!(descriptor.code, "01000008");
    }

    #[tokio::test]
    async fn test_next_child_code_rejects_root_parent() {
        let service = CoaService::new(seeded_store().await);

        let err = service.next_child_code("Assets").await.unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedLevel(1)));
    }

    #[tokio::test]
    async fn test_next_child_code_unknown_parent() {
        let service = CoaService::new(seeded_store().await);

        let err = service.next_child_code("Equity").await.unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn test_find_child_code_returns_stored_code() {
        let store = seeded_store().await;
        let parent = store.find_by_name("Current Assets").await.unwrap().unwrap();
        let mut child = NewAccount::new(
            "01000003".to_string(),
            "Petty Cash".to_string(),
            "asset".to_string(),
            3,
        );
        child.parent_id = Some(parent.id);
        let child = store.insert(child).await.unwrap();

        let service = CoaService::new(store);
        let descriptor = service
            .find_child_code("Current Assets", "petty cash")
            .await
            .unwrap();
        assert_eq!(descriptor.id, Some(child.id));
        assert_eq!(descriptor.code, "01000003");
        assert_eq!(descriptor.level, 3);

        let err = service
            .find_child_code("Current Assets", "Missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ChildNotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_or_create_allocates_fixed_width_codes() {
        let service = CoaService::new(seeded_store().await);

        let first = service
            .get_or_create_child("Assets", "Cash", 1, 2)
            .await
            .unwrap();
        assert_eq!(first.code, "0101");

        let second = service
            .get_or_create_child("Assets", "Receivables", 1, 2)
            .await
            .unwrap();
        assert_eq!(second.code, "0102");
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let store = seeded_store().await;
        let service = CoaService::new(store.clone());
        let before = store.find_all().await.unwrap().len();

        let first = service
            .get_or_create_child("Current Assets", "Inventory", 2, 3)
            .await
            .unwrap();
        let again = service
            .get_or_create_child("current assets", "inventory", 2, 3)
            .await
            .unwrap();

        assert_eq!(first.code, again.code);
        assert_eq!(first.id, again.id);
        // Exactly one insert across both calls.
        assert_eq!(store.find_all().await.unwrap().len(), before + 1);
    }

    #[tokio::test]
    async fn test_get_or_create_validates_level_chain() {
        let service = CoaService::new(seeded_store().await);

        let err = service
            .get_or_create_child("Assets", "Cash", 1, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_or_create_unknown_parent_level() {
        let service = CoaService::new(seeded_store().await);

        // "Assets" exists, but not at level 3.
        let err = service
            .get_or_create_child("Assets", "Cash", 3, 4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ParentNotFound(_)));
    }

    #[tokio::test]
    async fn test_concurrent_get_or_create_yields_distinct_codes() {
        let service = Arc::new(CoaService::new(seeded_store().await));

        let mut handles = Vec::new();
        for i in 0..4 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .get_or_create_child("Current Assets", &format!("Branch {i}"), 2, 3)
                    .await
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            let descriptor = handle.await.unwrap().unwrap();
            codes.insert(descriptor.code);
        }
        assert_eq!(codes.len(), 4);
    }

    #[tokio::test]
    async fn test_find_all_builds_tree() {
        let store = seeded_store().await;
        let service = CoaService::new(store);
        service
            .get_or_create_child("Current Assets", "Cash", 2, 3)
            .await
            .unwrap();

        let tree = service.find_all().await.unwrap();
        assert_eq!(tree.roots.len(), 1);
        assert!(tree.orphans.is_empty());
        assert_eq!(tree.roots[0].children[0].children.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failures_propagate_unchanged() {
        let mut store = MockStore::new();
        store
            .expect_find_by_name()
            .returning(|_| Err(DomainError::DatabaseError("connection reset".to_string())));

        let service = CoaService::new(Arc::new(store));
        let err = service.next_child_code("Assets").await.unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(msg) if msg == "connection reset"));
    }
}
