//! Error types for state access and transactions.
//!
//! Validation problems are not errors here: they are reported through
//! [`ValidationResult`](crate::transaction::ValidationResult). The types below
//! cover hard failures only.

use thiserror::Error;

use crate::state::StatePath;
use crate::transaction::{Operation, TransactionState, ValidationResult};

/// Failure of a single store write.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("no character with id {entity} for path {path}")]
    UnknownEntity { path: StatePath, entity: String },

    #[error("cannot store {value} at {path}: {reason}")]
    InvalidValue {
        path: StatePath,
        value: String,
        reason: String,
    },

    #[error("{0} cannot be cleared")]
    NotClearable(StatePath),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn invalid_value(
        path: &StatePath,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.clone(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// A dotted path string that does not name an addressable field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathParseError {
    #[error("unknown state path: {0}")]
    Unknown(String),

    #[error("invalid entity id '{id}' in path {path}")]
    InvalidEntity { path: String, id: String },
}

/// Hard transaction failures.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The transaction already reached a terminal state.
    #[error("transaction '{description}' is already {state}")]
    Finished {
        description: String,
        state: TransactionState,
    },

    /// The operation cannot apply to the value currently stored at the path.
    #[error("cannot {operation} at {path}: {message}")]
    TypeMismatch {
        path: StatePath,
        operation: Operation,
        message: String,
    },

    /// A scoped transaction tried to auto-commit and failed validation.
    #[error("transaction rejected with {} validation error(s)", .0.errors.len())]
    Rejected(ValidationResult),

    /// The store failed while applying. Everything applied so far was
    /// reverted, except the paths listed in `rollback_failures`.
    #[error(
        "failed to write {path} during commit: {source} ({} path(s) not restored)",
        .rollback_failures.len()
    )]
    Apply {
        path: StatePath,
        #[source]
        source: StoreError,
        rollback_failures: Vec<(StatePath, StoreError)>,
    },
}

/// Errors loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}
