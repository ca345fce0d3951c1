//! Values read from and written to addressable state.

use serde::{Deserialize, Serialize};

/// Relative tolerance used when comparing numeric values.
const FLOAT_TOLERANCE: f64 = 1e-9;

/// A value held at a [`StatePath`](super::StatePath).
///
/// Absence is modelled as `Option<StateValue>` at the store boundary rather
/// than as a variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<StateValue>),
}

impl StateValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, StateValue::Int(_) | StateValue::Float(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Int(n) => Some(*n as f64),
            StateValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Integer view. Floats qualify only when they carry no fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Int(n) => Some(*n),
            StateValue::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
                Some(*x as i64)
            }
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            StateValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Sum of two numbers. Integers stay integral unless the sum overflows.
    pub fn add(&self, other: &StateValue) -> Option<StateValue> {
        match (self, other) {
            (StateValue::Int(a), StateValue::Int(b)) => a.checked_add(*b).map(StateValue::Int),
            _ => Some(StateValue::Float(self.as_f64()? + other.as_f64()?)),
        }
    }

    pub fn sub(&self, other: &StateValue) -> Option<StateValue> {
        match (self, other) {
            (StateValue::Int(a), StateValue::Int(b)) => a.checked_sub(*b).map(StateValue::Int),
            _ => Some(StateValue::Float(self.as_f64()? - other.as_f64()?)),
        }
    }

    pub fn mul(&self, other: &StateValue) -> Option<StateValue> {
        match (self, other) {
            (StateValue::Int(a), StateValue::Int(b)) => a.checked_mul(*b).map(StateValue::Int),
            _ => Some(StateValue::Float(self.as_f64()? * other.as_f64()?)),
        }
    }

    /// Equality that ignores the Int/Float distinction. Two integers compare
    /// exactly; a small tolerance applies only when a float is involved.
    pub fn approx_eq(&self, other: &StateValue) -> bool {
        if let (StateValue::Int(a), StateValue::Int(b)) = (self, other) {
            return a == b;
        }
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => {
                let scale = a.abs().max(b.abs()).max(1.0);
                (a - b).abs() <= FLOAT_TOLERANCE * scale
            }
            _ => self == other,
        }
    }
}

/// Compare two optional values the way the desync check needs: both absent
/// matches, integers match exactly, floats match within tolerance.
pub fn values_match(a: Option<&StateValue>, b: Option<&StateValue>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.approx_eq(b),
        _ => false,
    }
}

impl std::fmt::Display for StateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateValue::Bool(b) => write!(f, "{}", b),
            StateValue::Int(n) => write!(f, "{}", n),
            StateValue::Float(x) => write!(f, "{}", x),
            StateValue::Text(s) => write!(f, "{:?}", s),
            StateValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Bool(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl From<i32> for StateValue {
    fn from(value: i32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<u32> for StateValue {
    fn from(value: u32) -> Self {
        StateValue::Int(value as i64)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Text(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Text(value)
    }
}

impl From<Vec<StateValue>> for StateValue {
    fn from(value: Vec<StateValue>) -> Self {
        StateValue::List(value)
    }
}
