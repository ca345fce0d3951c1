//! Pending state changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ValidationError, ValidationErrorKind};
use crate::state::{StatePath, StateValue};

/// The kind of mutation a change performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Set,
    Add,
    Subtract,
    Multiply,
    Append,
    Remove,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Set => "set",
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Append => "append",
            Operation::Remove => "remove",
        }
    }

    /// Compute the value this operation produces from `before`.
    ///
    /// Absent numbers count as zero and absent lists as empty.
    pub fn apply(
        &self,
        before: Option<&StateValue>,
        operand: &StateValue,
    ) -> Result<StateValue, String> {
        match self {
            Operation::Set => Ok(operand.clone()),
            Operation::Add | Operation::Subtract | Operation::Multiply => {
                let base = numeric_base(before)?;
                let result = match self {
                    Operation::Add => base.add(operand),
                    Operation::Subtract => base.sub(operand),
                    _ => base.mul(operand),
                };
                result.ok_or_else(|| format!("cannot {} {} and {}", self.name(), base, operand))
            }
            Operation::Append => {
                let mut items = list_base(before)?;
                items.push(operand.clone());
                Ok(StateValue::List(items))
            }
            Operation::Remove => {
                let mut items = list_base(before)?;
                if let Some(index) = items.iter().position(|item| item.approx_eq(operand)) {
                    items.remove(index);
                }
                Ok(StateValue::List(items))
            }
        }
    }
}

fn numeric_base(before: Option<&StateValue>) -> Result<StateValue, String> {
    match before {
        None => Ok(StateValue::Int(0)),
        Some(value) if value.is_numeric() => Ok(value.clone()),
        Some(value) => Err(format!("{} is not a number", value)),
    }
}

fn list_base(before: Option<&StateValue>) -> Result<Vec<StateValue>, String> {
    match before {
        None => Ok(Vec::new()),
        Some(StateValue::List(items)) => Ok(items.clone()),
        Some(value) => Err(format!("{} is not a list", value)),
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One pending mutation inside a transaction.
///
/// `after` is fixed when the change is queued and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub path: StatePath,
    pub operation: Operation,
    /// Value read from the store when the change was queued.
    pub before: Option<StateValue>,
    /// Value written on commit.
    pub after: StateValue,
    /// Operand of the operation; `None` for `Set`.
    pub delta: Option<StateValue>,
    pub reason: String,
    pub validated: bool,
    pub timestamp: DateTime<Utc>,
}

impl StateChange {
    pub fn new(
        path: StatePath,
        operation: Operation,
        before: Option<StateValue>,
        after: StateValue,
        delta: Option<StateValue>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path,
            operation,
            before,
            after,
            delta,
            reason: reason.into(),
            validated: false,
            timestamp: Utc::now(),
        }
    }

    /// Verify `before ± delta == after` for additive changes.
    pub(crate) fn calculation_error(&self) -> Option<ValidationError> {
        let sign = match self.operation {
            Operation::Add => 1.0,
            Operation::Subtract => -1.0,
            _ => return None,
        };
        let before = self.before.as_ref().map_or(Some(0.0), StateValue::as_f64);
        let delta = self.delta.as_ref().and_then(StateValue::as_f64);

        let expected = match (before, delta) {
            (Some(before), Some(delta)) => StateValue::Float(before + sign * delta),
            _ => {
                return Some(ValidationError {
                    path: self.path.clone(),
                    kind: ValidationErrorKind::CalculationError,
                    message: format!(
                        "{} on {} has non-numeric operands",
                        self.operation, self.path
                    ),
                    expected: None,
                    actual: Some(self.after.clone()),
                })
            }
        };

        if expected.approx_eq(&self.after) {
            None
        } else {
            Some(ValidationError {
                path: self.path.clone(),
                kind: ValidationErrorKind::CalculationError,
                message: format!(
                    "{} on {} should produce {}, change records {}",
                    self.operation, self.path, expected, self.after
                ),
                expected: Some(expected),
                actual: Some(self.after.clone()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WorldField;

    #[test]
    fn test_apply_arithmetic() {
        let before = StateValue::Int(80);
        assert_eq!(
            Operation::Subtract.apply(Some(&before), &StateValue::Int(50)),
            Ok(StateValue::Int(30))
        );
        assert_eq!(
            Operation::Add.apply(None, &StateValue::Int(5)),
            Ok(StateValue::Int(5))
        );
        assert!(Operation::Multiply
            .apply(Some(&StateValue::from("x")), &StateValue::Int(2))
            .is_err());
    }

    #[test]
    fn test_apply_lists() {
        let before = StateValue::List(vec!["rope".into(), "torch".into(), "rope".into()]);
        assert_eq!(
            Operation::Remove.apply(Some(&before), &"rope".into()),
            Ok(StateValue::List(vec!["torch".into(), "rope".into()]))
        );
        assert_eq!(
            Operation::Remove.apply(Some(&before), &"sword".into()),
            Ok(before.clone())
        );
        assert_eq!(
            Operation::Append.apply(None, &"map".into()),
            Ok(StateValue::List(vec!["map".into()]))
        );
        assert!(Operation::Append.apply(Some(&StateValue::Int(1)), &"map".into()).is_err());
    }

    #[test]
    fn test_calculation_check() {
        let path = StatePath::world(WorldField::DangerLevel);
        let good = StateChange::new(
            path.clone(),
            Operation::Add,
            Some(StateValue::Float(0.1)),
            StateValue::Float(0.3),
            Some(StateValue::Float(0.2)),
            "storm rolls in",
        );
        assert!(good.calculation_error().is_none());

        let bad = StateChange::new(
            path,
            Operation::Subtract,
            Some(StateValue::Int(80)),
            StateValue::Int(20),
            Some(StateValue::Int(50)),
            "miscounted",
        );
        let err = bad.calculation_error().unwrap();
        assert_eq!(err.kind, ValidationErrorKind::CalculationError);
        assert_eq!(err.expected, Some(StateValue::Float(30.0)));
    }

    #[test]
    fn test_set_skips_calculation_check() {
        let change = StateChange::new(
            StatePath::world(WorldField::Day),
            Operation::Set,
            Some(StateValue::Int(1)),
            StateValue::Int(9),
            None,
            "time skip",
        );
        assert!(change.calculation_error().is_none());
    }
}
