//! Domain errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Parent account not found: {0}")]
    ParentNotFound(String),

    #[error("Child account not found under {parent}: {child}")]
    ChildNotFound { parent: String, child: String },

    #[error("Ambiguous account name: {0}")]
    AmbiguousName(String),

    #[error("Invalid account code: {0}")]
    InvalidCode(String),

    #[error("Unsupported parent level: {0}")]
    UnsupportedLevel(i32),

    #[error("Duplicate account code: {0}")]
    DuplicateCode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
