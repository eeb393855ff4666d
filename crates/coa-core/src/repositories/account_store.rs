//! Account store trait (port)

use async_trait::async_trait;

use coa_shared::types::EntityId;

use crate::domain::{Account, NewAccount};
use crate::error::DomainError;

/// Durable keyed storage for accounts.
///
/// Name lookups are case-insensitive; lookups that hit more than one
/// account fail with [`DomainError::AmbiguousName`] rather than silently
/// picking one. `insert`/`bulk_insert` enforce global code uniqueness and
/// surface a collision as [`DomainError::DuplicateCode`]; callers that
/// allocate codes rely on that to retry safely under concurrency.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Every stored account, flat, in deterministic (code) order.
    async fn find_all(&self) -> Result<Vec<Account>, DomainError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Account>, DomainError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError>;

    async fn find_by_name_and_level(
        &self,
        name: &str,
        level: i32,
    ) -> Result<Option<Account>, DomainError>;

    /// Children of the given parent; `None` selects the roots.
    async fn find_by_parent_id(
        &self,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<Account>, DomainError>;

    /// Named child under a parent, optionally narrowed to one level. When
    /// several children share the name, the one with the highest code wins.
    async fn find_child_by_name(
        &self,
        parent_id: EntityId,
        name: &str,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError>;

    /// The child with the highest code under a parent (order by code
    /// descending, take first), optionally narrowed to one level.
    async fn find_top_sibling_by_parent(
        &self,
        parent_id: EntityId,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError>;

    /// Persists one account, assigning id and `created_at`.
    async fn insert(&self, account: NewAccount) -> Result<Account, DomainError>;

    /// Persists a batch atomically: either every row is stored or none is.
    async fn bulk_insert(&self, accounts: Vec<NewAccount>) -> Result<Vec<Account>, DomainError>;

    /// Re-points an account at a new parent and stamps `updated_at`.
    async fn update_parent(
        &self,
        id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<(), DomainError>;
}
