//! Constraint registry: bounds attached to state paths.
//!
//! A constraint may carry a fixed `min`/`max` and a `max_ref`, which names
//! another path whose *current* value is the upper bound ("hp.current must not
//! exceed hp.max").

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{EntityId, ResourceKind};
use crate::error::ConfigError;
use crate::state::{StatePath, StateStore, StateValue};
use crate::transaction::{ValidationError, ValidationErrorKind};

/// Bounds for one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    /// Path whose current value is the live maximum.
    #[serde(default)]
    pub max_ref: Option<StatePath>,
}

impl Constraint {
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            ..Default::default()
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            max: Some(max),
            ..Default::default()
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            max_ref: None,
        }
    }

    /// Also cap the value by the current value at `path`.
    pub fn capped_by(mut self, path: StatePath) -> Self {
        self.max_ref = Some(path);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ConstraintFile {
    #[serde(default, rename = "constraint")]
    constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Deserialize)]
struct ConstraintEntry {
    path: StatePath,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
    #[serde(default)]
    max_ref: Option<StatePath>,
}

/// Mapping from path to its bounds.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    constraints: HashMap<StatePath, Constraint>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load constraints from TOML:
    ///
    /// ```toml
    /// [[constraint]]
    /// path = "world.danger_level"
    /// min = 0.0
    /// max = 1.0
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConstraintFile = toml::from_str(source)?;
        let mut registry = Self::new();
        for entry in file.constraints {
            registry.insert(
                entry.path,
                Constraint {
                    min: entry.min,
                    max: entry.max,
                    max_ref: entry.max_ref,
                },
            );
        }
        Ok(registry)
    }

    /// Register or replace the constraint for `path`.
    pub fn insert(&mut self, path: StatePath, constraint: Constraint) -> Option<Constraint> {
        self.constraints.insert(path, constraint)
    }

    pub fn with(mut self, path: StatePath, constraint: Constraint) -> Self {
        self.insert(path, constraint);
        self
    }

    /// Keep every pool of `owner` within `0 ..= max`.
    pub fn add_pool_bounds(&mut self, owner: EntityId) {
        for pool in ResourceKind::ALL {
            self.insert(
                StatePath::current(owner, pool),
                Constraint::at_least(0.0).capped_by(StatePath::max(owner, pool)),
            );
            self.insert(StatePath::max(owner, pool), Constraint::at_least(0.0));
        }
    }

    pub fn with_pool_bounds(mut self, owner: EntityId) -> Self {
        self.add_pool_bounds(owner);
        self
    }

    pub fn get(&self, path: &StatePath) -> Option<&Constraint> {
        self.constraints.get(path)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check `value` against the constraint registered for `path`.
    ///
    /// Non-numeric values and unresolvable `max_ref` targets are not range
    /// checked. Each violated bound yields its own error.
    pub fn check<S: StateStore + ?Sized>(
        &self,
        path: &StatePath,
        value: &StateValue,
        store: &S,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let (Some(constraint), Some(actual)) = (self.constraints.get(path), value.as_f64()) else {
            return errors;
        };

        let violation = |bound: StateValue, message: String| ValidationError {
            path: path.clone(),
            kind: ValidationErrorKind::RangeViolation,
            message,
            expected: Some(bound),
            actual: Some(value.clone()),
        };

        if let Some(min) = constraint.min {
            if actual < min {
                errors.push(violation(
                    StateValue::Float(min),
                    format!("{} would be {}, below minimum {}", path, value, min),
                ));
            }
        }
        if let Some(max) = constraint.max {
            if actual > max {
                errors.push(violation(
                    StateValue::Float(max),
                    format!("{} would be {}, above maximum {}", path, value, max),
                ));
            }
        }
        if let Some(max_ref) = &constraint.max_ref {
            if let Some(limit) = store.get(max_ref) {
                if limit.as_f64().is_some_and(|limit| actual > limit) {
                    errors.push(violation(
                        limit.clone(),
                        format!("{} would be {}, above {} ({})", path, value, max_ref, limit),
                    ));
                }
            }
        }

        errors
    }
}
