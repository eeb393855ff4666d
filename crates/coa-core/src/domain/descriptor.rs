//! Allocation response descriptor

use serde::{Deserialize, Serialize};

use coa_shared::types::EntityId;

/// What a caller of the allocation operations gets back: the code, type,
/// and level a child carries (or would carry), plus its parent. `id` is
/// populated only when the descriptor refers to an account that already
/// exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildDescriptor {
    pub id: Option<EntityId>,
    pub code: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub level: i32,
    pub parent_id: EntityId,
}
