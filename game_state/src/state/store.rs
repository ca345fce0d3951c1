//! The store interface consumed by the transaction engine.

use super::{StatePath, StateValue};
use crate::error::StoreError;

/// Read/write access to path-addressed game values.
///
/// The transaction engine never touches persistence directly; it only goes
/// through this trait.
pub trait StateStore {
    /// Current value at `path`, or `None` when nothing is stored there.
    fn get(&self, path: &StatePath) -> Option<StateValue>;

    /// Overwrite the value at `path`.
    fn set(&mut self, path: &StatePath, value: StateValue) -> Result<(), StoreError>;

    /// Return `path` to the absent state. Used when rolling back a change
    /// whose prior value was absent.
    fn clear(&mut self, path: &StatePath) -> Result<(), StoreError>;
}
