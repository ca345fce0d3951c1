//! Validation outcomes for a batch of pending changes.

use serde::{Deserialize, Serialize};

use crate::state::{StatePath, StateValue};

/// Why a change failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// The store no longer holds the value the change was computed from.
    Desync,
    /// `after` does not follow from `before` and `delta`.
    CalculationError,
    /// `after` falls outside a registered constraint.
    RangeViolation,
}

/// A soft validation failure. Never raised, only reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: StatePath,
    pub kind: ValidationErrorKind,
    pub message: String,
    pub expected: Option<StateValue>,
    pub actual: Option<StateValue>,
}

impl ValidationError {
    pub(crate) fn desync(
        path: &StatePath,
        expected: Option<&StateValue>,
        actual: Option<StateValue>,
    ) -> Self {
        let show = |value: Option<&StateValue>| {
            value.map_or_else(|| "nothing".to_string(), |v| v.to_string())
        };
        Self {
            path: path.clone(),
            kind: ValidationErrorKind::Desync,
            message: format!(
                "{} changed since the transaction read it: expected {}, found {}",
                path,
                show(expected),
                show(actual.as_ref())
            ),
            expected: expected.cloned(),
            actual,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Result of validating every queued change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors reported against `path`.
    pub fn errors_for<'a>(
        &'a self,
        path: &'a StatePath,
    ) -> impl Iterator<Item = &'a ValidationError> + 'a {
        self.errors.iter().filter(move |e| &e.path == path)
    }

    pub fn has_kind(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}
