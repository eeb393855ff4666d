//! Seed row entity

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One flat row of a seed document: code, name, classification, and depth.
/// Parent links are not part of the seed format; the seeder derives them
/// from row order and level after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SeedRow {
    #[validate(length(min = 1, max = 20, message = "Code must be between 1 and 20 characters"))]
    pub code: String,

    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(length(max = 50, message = "Type too long"))]
    pub account_type: String,

    #[validate(range(min = 1, message = "Level starts at 1"))]
    pub level: i32,
}
