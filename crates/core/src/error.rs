//! Domain error model.

use thiserror::Error;

/// Result type used across the engine crates.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic data/business failures (validation,
/// identity, invariants). I/O and format concerns belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. a threshold out of range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record identifier was missing or unusable.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// An engine invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
