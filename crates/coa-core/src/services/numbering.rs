// ============================================================================
// COA Core - Code Numbering Policies
// File: crates/coa-core/src/services/numbering.rs
// ============================================================================
//! Sibling-code computation.
//!
//! Two numbering policies coexist and must not be unified, since they
//! produce different codes for the same parent:
//!
//! - the **leveled policy** keys prefix validation and suffix width on the
//!   parent's level (general allocation path),
//! - the **fixed-width policy** always appends a 2-digit suffix
//!   (get-or-create path), independent of the level table.
//!
//! In both, a child code extends the parent's full code, so the code alone
//! identifies the chain of ancestors.

use crate::error::DomainError;

/// Per-level code shape: how many leading characters of the parent code are
/// required, and how wide the numeric sibling suffix is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRule {
    pub prefix_len: usize,
    pub suffix_width: usize,
}

/// Code-shape table keyed by the parent's level. Levels outside the table
/// cannot have children allocated under the leveled policy.
pub fn level_rule(parent_level: i32) -> Result<LevelRule, DomainError> {
    match parent_level {
        2 => Ok(LevelRule { prefix_len: 2, suffix_width: 4 }),
        3 => Ok(LevelRule { prefix_len: 3, suffix_width: 3 }),
        4 => Ok(LevelRule { prefix_len: 4, suffix_width: 2 }),
        other => Err(DomainError::UnsupportedLevel(other)),
    }
}

/// Numeric suffix of `code` after `prefix_len` characters. A missing or
/// non-numeric suffix is an error, never a silent zero.
fn parse_suffix(code: &str, prefix_len: usize) -> Result<u32, DomainError> {
    let suffix = code
        .get(prefix_len..)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DomainError::InvalidCode(format!("{code}: missing numeric suffix")))?;
    suffix
        .parse::<u32>()
        .map_err(|_| DomainError::InvalidCode(format!("{code}: non-numeric suffix {suffix:?}")))
}

/// Next sibling code under `parent_code`, leveled policy.
///
/// `top_sibling` is the existing child with the highest code, if any; its
/// suffix is incremented. With no sibling the sequence starts at 1.
pub fn next_leveled_code(
    parent_code: &str,
    parent_level: i32,
    top_sibling: Option<&str>,
) -> Result<String, DomainError> {
    let rule = level_rule(parent_level)?;
    if parent_code.len() < rule.prefix_len {
        return Err(DomainError::InvalidCode(format!(
            "{parent_code}: shorter than the level-{parent_level} prefix ({} chars)",
            rule.prefix_len
        )));
    }

    let next = match top_sibling {
        Some(code) => parse_suffix(code, parent_code.len())? + 1,
        None => 1,
    };

    Ok(format!("{parent_code}{next:0width$}", width = rule.suffix_width))
}

/// Next sibling code under `parent_code`, fixed-width policy: always a
/// 2-digit suffix, regardless of the parent's level.
pub fn next_fixed_code(parent_code: &str, top_sibling: Option<&str>) -> Result<String, DomainError> {
    let next = match top_sibling {
        Some(code) => parse_suffix(code, parent_code.len())? + 1,
        None => 1,
    };
    Ok(format!("{parent_code}{next:02}"))
}
