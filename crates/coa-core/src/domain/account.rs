// ============================================================================
// COA Core - Account Entity
// File: crates/coa-core/src/domain/account.rs
// Description: Chart-of-accounts entry with code, depth, and parent link
// ============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use coa_shared::types::EntityId;

/// A stored chart-of-accounts entry.
///
/// `code` is unique across the whole chart and encodes parentage: its
/// leading characters equal the parent's full code, the fixed-width numeric
/// tail enumerates siblings. `level` is the depth in the hierarchy, root = 1,
/// and always equals the parent's level + 1. `parent_id` is `None` only for
/// roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub level: i32,
    pub parent_id: Option<EntityId>,

    // Audit fields
    pub created_by: Option<EntityId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insertion payload for a new account. The store assigns `id` and
/// `created_at` on insert.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, max = 20, message = "Code must be between 1 and 20 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(length(max = 50, message = "Type too long"))]
    pub account_type: String,

    #[validate(range(min = 1, message = "Level starts at 1"))]
    pub level: i32,

    pub parent_id: Option<EntityId>,
    pub created_by: Option<EntityId>,
}

impl NewAccount {
    pub fn new(code: String, name: String, account_type: String, level: i32) -> Self {
        Self {
            code,
            name: name.trim().to_string(),
            account_type,
            level,
            parent_id: None,
            created_by: None,
        }
    }
}
