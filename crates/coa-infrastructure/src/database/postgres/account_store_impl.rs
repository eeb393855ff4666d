// ============================================================================
// COA Infrastructure - PostgreSQL Account Store
// File: crates/coa-infrastructure/src/database/postgres/account_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use coa_core::domain::{Account, NewAccount};
use coa_core::error::DomainError;
use coa_core::repositories::AccountStore;
use coa_shared::types::{new_id, EntityId};

const ACCOUNT_COLUMNS: &str =
    "id, code, name, account_type, level, parent_id, created_by, created_at, updated_at";

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct AccountRow {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: String,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            code: row.code,
            name: row.name,
            account_type: row.account_type,
            level: row.level,
            parent_id: row.parent_id,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A unique violation on the code index is a lost allocation race, which
/// callers handle by recomputing; everything else is opaque store failure.
fn map_write_err(e: sqlx::Error, code: &str) -> DomainError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return DomainError::DuplicateCode(code.to_string());
        }
    }
    error!("Database error writing account {}: {}", code, e);
    DomainError::DatabaseError(e.to_string())
}

fn map_read_err(e: sqlx::Error, what: &str) -> DomainError {
    error!("Database error {}: {}", what, e);
    DomainError::DatabaseError(e.to_string())
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_all(&self) -> Result<Vec<Account>, DomainError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY code"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_err(e, "listing accounts"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_read_err(e, "finding account by code"))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Account>, DomainError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(name) = LOWER($1) LIMIT 2"
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_err(e, "finding account by name"))?;

        if rows.len() > 1 {
            return Err(DomainError::AmbiguousName(name.to_string()));
        }
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn find_by_name_and_level(
        &self,
        name: &str,
        level: i32,
    ) -> Result<Option<Account>, DomainError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts \
             WHERE LOWER(name) = LOWER($1) AND level = $2 LIMIT 2"
        ))
        .bind(name)
        .bind(level)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_read_err(e, "finding account by name and level"))?;

        if rows.len() > 1 {
            return Err(DomainError::AmbiguousName(name.to_string()));
        }
        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn find_by_parent_id(
        &self,
        parent_id: Option<EntityId>,
    ) -> Result<Vec<Account>, DomainError> {
        let query = match parent_id {
            Some(_) => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE parent_id = $1 ORDER BY code"
            ),
            None => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE parent_id IS NULL ORDER BY code"
            ),
        };

        let mut q = sqlx::query_as::<_, AccountRow>(&query);
        if let Some(id) = parent_id {
            q = q.bind(id);
        }

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_read_err(e, "finding accounts by parent"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_child_by_name(
        &self,
        parent_id: EntityId,
        name: &str,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError> {
        let query = match level {
            Some(_) => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                 WHERE parent_id = $1 AND LOWER(name) = LOWER($2) AND level = $3 \
                 ORDER BY code DESC LIMIT 1"
            ),
            None => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                 WHERE parent_id = $1 AND LOWER(name) = LOWER($2) \
                 ORDER BY code DESC LIMIT 1"
            ),
        };

        let mut q = sqlx::query_as::<_, AccountRow>(&query).bind(parent_id).bind(name);
        if let Some(level) = level {
            q = q.bind(level);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_err(e, "finding child by name"))?;

        Ok(row.map(Into::into))
    }

    async fn find_top_sibling_by_parent(
        &self,
        parent_id: EntityId,
        level: Option<i32>,
    ) -> Result<Option<Account>, DomainError> {
        let query = match level {
            Some(_) => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                 WHERE parent_id = $1 AND level = $2 ORDER BY code DESC LIMIT 1"
            ),
            None => format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts \
                 WHERE parent_id = $1 ORDER BY code DESC LIMIT 1"
            ),
        };

        let mut q = sqlx::query_as::<_, AccountRow>(&query).bind(parent_id);
        if let Some(level) = level {
            q = q.bind(level);
        }

        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_read_err(e, "finding top sibling"))?;

        Ok(row.map(Into::into))
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DomainError> {
        let row: AccountRow = sqlx::query_as(&format!(
            "INSERT INTO accounts \
             (id, code, name, account_type, level, parent_id, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(new_id())
        .bind(&account.code)
        .bind(&account.name)
        .bind(&account.account_type)
        .bind(account.level)
        .bind(account.parent_id)
        .bind(account.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_err(e, &account.code))?;

        info!("Account created: {}", row.code);
        Ok(row.into())
    }

    async fn bulk_insert(&self, accounts: Vec<NewAccount>) -> Result<Vec<Account>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_read_err(e, "opening bulk-insert transaction"))?;

        let mut stored = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let row: AccountRow = sqlx::query_as(&format!(
                "INSERT INTO accounts \
                 (id, code, name, account_type, level, parent_id, created_by, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                 RETURNING {ACCOUNT_COLUMNS}"
            ))
            .bind(new_id())
            .bind(&account.code)
            .bind(&account.name)
            .bind(&account.account_type)
            .bind(account.level)
            .bind(account.parent_id)
            .bind(account.created_by)
            .bind(Utc::now())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_err(e, &account.code))?;
            stored.push(row.into());
        }

        tx.commit()
            .await
            .map_err(|e| map_read_err(e, "committing bulk insert"))?;

        info!("Bulk insert stored {} accounts", stored.len());
        Ok(stored)
    }

    async fn update_parent(
        &self,
        id: EntityId,
        parent_id: Option<EntityId>,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE accounts SET parent_id = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(parent_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_read_err(e, "updating parent link"))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }
}
