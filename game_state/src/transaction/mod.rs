//! Transaction engine - atomic, validated batches of state changes.
//!
//! A transaction works in three phases:
//! 1. **Queue**: each operation reads the current value as `before` and
//!    computes `after` immediately
//! 2. **Validate**: every change is checked for desync (the store moved since
//!    it was read), arithmetic consistency, and registered constraints
//! 3. **Apply**: if the whole batch is valid, changes are written in queued
//!    order; a store fault part way through reverts everything written so far
//!
//! A second operation on the same path within one transaction reads `before`
//! from the store again, not from the first operation's `after`. Express
//! compound changes to one path as a single combined delta.

mod change;
mod engine;
mod validation;

pub use change::*;
pub use engine::*;
pub use validation::*;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::constraints::ConstraintRegistry;
use crate::error::{StoreError, TransactionError};
use crate::state::{values_match, StatePath, StateStore, StateValue};

/// Lifecycle of a transaction. Both `Committed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionState {
    Pending,
    Committed,
    RolledBack,
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransactionState::Pending => "pending",
            TransactionState::Committed => "committed",
            TransactionState::RolledBack => "rolled back",
        })
    }
}

/// An ordered batch of changes bound to a store.
pub struct Transaction<'a, S: StateStore + ?Sized> {
    store: &'a mut S,
    constraints: Option<&'a ConstraintRegistry>,
    description: String,
    changes: Vec<StateChange>,
    /// Length of the prefix of `changes` already written to the store.
    applied: usize,
    state: TransactionState,
    last_validation: Option<ValidationResult>,
}

impl<'a, S: StateStore + ?Sized> Transaction<'a, S> {
    /// Open a pending transaction against `store`.
    pub fn begin(store: &'a mut S, description: impl Into<String>) -> Self {
        let description = description.into();
        debug!(%description, "transaction opened");
        Self {
            store,
            constraints: None,
            description,
            changes: Vec::new(),
            applied: 0,
            state: TransactionState::Pending,
            last_validation: None,
        }
    }

    /// Check changes against `constraints` during validation.
    pub fn with_constraints(mut self, constraints: &'a ConstraintRegistry) -> Self {
        self.constraints = Some(constraints);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Every queued change, in order.
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    /// The changes currently written to the store.
    pub fn applied(&self) -> &[StateChange] {
        &self.changes[..self.applied]
    }

    /// Result of the most recent validation, including the one run by `commit`.
    pub fn last_validation(&self) -> Option<&ValidationResult> {
        self.last_validation.as_ref()
    }

    /// Read-only view of the bound store.
    pub fn store(&self) -> &S {
        &*self.store
    }

    pub fn set(
        &mut self,
        path: StatePath,
        value: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Set, value.into(), reason.into())
    }

    pub fn add(
        &mut self,
        path: StatePath,
        delta: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Add, delta.into(), reason.into())
    }

    pub fn subtract(
        &mut self,
        path: StatePath,
        delta: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Subtract, delta.into(), reason.into())
    }

    pub fn multiply(
        &mut self,
        path: StatePath,
        factor: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Multiply, factor.into(), reason.into())
    }

    pub fn append(
        &mut self,
        path: StatePath,
        item: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Append, item.into(), reason.into())
    }

    pub fn remove(
        &mut self,
        path: StatePath,
        item: impl Into<StateValue>,
        reason: impl Into<String>,
    ) -> Result<(), TransactionError> {
        self.queue(path, Operation::Remove, item.into(), reason.into())
    }

    /// Queue a change built by the caller, as-is.
    ///
    /// Its `before` and `after` are trusted until validation, which is where a
    /// mismatched `after` surfaces as a calculation error.
    pub fn push_change(&mut self, mut change: StateChange) -> Result<(), TransactionError> {
        self.ensure_pending()?;
        change.validated = false;
        debug!(path = %change.path, operation = %change.operation, "change queued");
        self.changes.push(change);
        Ok(())
    }

    fn queue(
        &mut self,
        path: StatePath,
        operation: Operation,
        operand: StateValue,
        reason: String,
    ) -> Result<(), TransactionError> {
        self.ensure_pending()?;
        let before = self.store.get(&path);
        let after = operation
            .apply(before.as_ref(), &operand)
            .map_err(|message| TransactionError::TypeMismatch {
                path: path.clone(),
                operation,
                message,
            })?;
        let delta = match operation {
            Operation::Set => None,
            _ => Some(operand),
        };
        debug!(%path, %operation, %after, "change queued");
        self.changes
            .push(StateChange::new(path, operation, before, after, delta, reason));
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), TransactionError> {
        match self.state {
            TransactionState::Pending => Ok(()),
            state => Err(TransactionError::Finished {
                description: self.description.clone(),
                state,
            }),
        }
    }

    /// Validate every queued change without touching the store.
    ///
    /// A desynced change skips its remaining checks; the rest of the batch is
    /// still checked so the result lists every problem at once.
    pub fn validate(&mut self) -> ValidationResult {
        let mut errors = Vec::new();

        for change in &mut self.changes {
            change.validated = false;

            let actual = self.store.get(&change.path);
            if !values_match(change.before.as_ref(), actual.as_ref()) {
                errors.push(ValidationError::desync(&change.path, change.before.as_ref(), actual));
                continue;
            }

            let mut change_errors = Vec::new();
            change_errors.extend(change.calculation_error());
            if let Some(constraints) = self.constraints {
                change_errors.extend(constraints.check(&change.path, &change.after, &*self.store));
            }

            change.validated = change_errors.is_empty();
            errors.extend(change_errors);
        }

        let result = ValidationResult::from_errors(errors);
        if !result.is_valid {
            warn!(
                description = %self.description,
                errors = result.errors.len(),
                "transaction failed validation"
            );
        }
        self.last_validation = Some(result.clone());
        result
    }

    /// Validate, then apply every change in queued order.
    ///
    /// Returns `Ok(false)` when validation fails; nothing is written and the
    /// transaction is rolled back. If the store faults while applying, the
    /// changes written so far are reverted and the fault is returned.
    pub fn commit(&mut self) -> Result<bool, TransactionError> {
        self.ensure_pending()?;

        if !self.validate().is_valid {
            self.state = TransactionState::RolledBack;
            return Ok(false);
        }

        for index in 0..self.changes.len() {
            let change = &self.changes[index];
            if let Err(source) = self.store.set(&change.path, change.after.clone()) {
                let path = change.path.clone();
                error!(
                    description = %self.description,
                    %path,
                    error = %source,
                    "store write failed during commit, rolling back"
                );
                let rollback_failures = self.revert_applied();
                self.state = TransactionState::RolledBack;
                return Err(TransactionError::Apply {
                    path,
                    source,
                    rollback_failures,
                });
            }
            self.applied = index + 1;
        }

        self.state = TransactionState::Committed;
        info!(
            description = %self.description,
            changes = self.changes.len(),
            "transaction committed"
        );
        Ok(true)
    }

    /// Discard the queued changes and close the transaction.
    ///
    /// A pending transaction has written nothing, so the store is not
    /// touched. Calling this again after a rollback (including the automatic
    /// one after a failed commit) does nothing. A committed transaction cannot
    /// be rolled back.
    pub fn rollback(&mut self) -> Result<(), TransactionError> {
        match self.state {
            TransactionState::RolledBack => Ok(()),
            TransactionState::Committed => Err(TransactionError::Finished {
                description: self.description.clone(),
                state: self.state,
            }),
            TransactionState::Pending => {
                self.state = TransactionState::RolledBack;
                info!(description = %self.description, "transaction rolled back");
                Ok(())
            }
        }
    }

    /// Write back `before` values for the applied prefix, newest first.
    /// Returns the paths that could not be restored.
    fn revert_applied(&mut self) -> Vec<(StatePath, StoreError)> {
        let mut failures = Vec::new();
        for change in self.changes[..self.applied].iter().rev() {
            let restored = match &change.before {
                Some(before) => self.store.set(&change.path, before.clone()),
                None => self.store.clear(&change.path),
            };
            if let Err(err) = restored {
                error!(
                    path = %change.path,
                    error = %err,
                    "failed to restore value during rollback"
                );
                failures.push((change.path.clone(), err));
            }
        }
        self.applied = 0;
        failures
    }

    /// Run `body` inside this transaction.
    ///
    /// If `body` returns `Ok` and did not finish the transaction itself, the
    /// transaction is committed; a rejected commit becomes
    /// [`TransactionError::Rejected`]. If `body` returns `Err`, the
    /// transaction is rolled back and the error passed through.
    pub fn run<T, E, F>(mut self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<TransactionError>,
    {
        match body(&mut self) {
            Ok(value) => {
                if self.state == TransactionState::Pending && !self.commit()? {
                    let rejected = self.last_validation.take().unwrap_or_default();
                    return Err(TransactionError::Rejected(rejected).into());
                }
                Ok(value)
            }
            Err(err) => {
                if self.state == TransactionState::Pending {
                    self.rollback()?;
                }
                Err(err)
            }
        }
    }
}

impl<S: StateStore + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if self.state == TransactionState::Pending && !self.changes.is_empty() {
            warn!(
                description = %self.description,
                changes = self.changes.len(),
                "transaction dropped without commit or rollback; changes discarded"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraint;
    use crate::entities::{Character, EntityId, ResourceKind};
    use crate::state::{CharacterField, WorldField};
    use crate::world_state::WorldState;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Arena {
        world: WorldState,
        caster: EntityId,
        target: EntityId,
    }

    fn arena() -> Arena {
        let mut world = WorldState::new();
        let caster = world.add_character(Character::new("Caster").with_mana(100));
        let target = world.add_character(Character::new("Goblin").with_hp(100));
        world.get_character_mut(caster).unwrap().resources.mana.current = 80;
        Arena { world, caster, target }
    }

    fn mp(arena: &Arena) -> StatePath {
        StatePath::current(arena.caster, ResourceKind::Mana)
    }

    fn hp(arena: &Arena) -> StatePath {
        StatePath::current(arena.target, ResourceKind::Hp)
    }

    /// A store another writer can change while a transaction holds it.
    #[derive(Clone)]
    struct SharedWorld(Rc<RefCell<WorldState>>);

    impl StateStore for SharedWorld {
        fn get(&self, path: &StatePath) -> Option<StateValue> {
            self.0.borrow().get(path)
        }

        fn set(&mut self, path: &StatePath, value: StateValue) -> Result<(), StoreError> {
            self.0.borrow_mut().set(path, value)
        }

        fn clear(&mut self, path: &StatePath) -> Result<(), StoreError> {
            self.0.borrow_mut().clear(path)
        }
    }

    /// Fails every `set` whose 1-based count is listed in `fail_on`,
    /// including rollback writes.
    struct FlakyStore {
        inner: WorldState,
        fail_on: Vec<usize>,
        sets: usize,
    }

    impl FlakyStore {
        fn new(inner: WorldState, fail_on: &[usize]) -> Self {
            Self {
                inner,
                fail_on: fail_on.to_vec(),
                sets: 0,
            }
        }
    }

    impl StateStore for FlakyStore {
        fn get(&self, path: &StatePath) -> Option<StateValue> {
            self.inner.get(path)
        }

        fn set(&mut self, path: &StatePath, value: StateValue) -> Result<(), StoreError> {
            self.sets += 1;
            if self.fail_on.contains(&self.sets) {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(path, value)
        }

        fn clear(&mut self, path: &StatePath) -> Result<(), StoreError> {
            self.inner.clear(path)
        }
    }

    #[test]
    fn test_fire_bolt_commits() {
        let mut arena = arena();
        let (mp, hp) = (mp(&arena), hp(&arena));
        let constraints = ConstraintRegistry::new().with(hp.clone(), Constraint::at_least(0.0));

        let mut tx =
            Transaction::begin(&mut arena.world, "Cast Fire Bolt").with_constraints(&constraints);
        tx.subtract(mp.clone(), 50, "spell cost").unwrap();
        tx.subtract(hp.clone(), 35, "fire damage").unwrap();

        assert!(tx.commit().unwrap());
        assert_eq!(tx.state(), TransactionState::Committed);
        assert_eq!(tx.applied(), tx.changes());
        assert!(tx.changes().iter().all(|c| c.validated));
        drop(tx);

        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(30)));
        assert_eq!(arena.world.get(&hp), Some(StateValue::Int(65)));
    }

    #[test]
    fn test_desync_rejects_whole_batch() {
        let arena = arena();
        let (mp, hp) = (mp(&arena), hp(&arena));
        let caster = arena.caster;
        let shared = SharedWorld(Rc::new(RefCell::new(arena.world)));
        let mut handle = shared.clone();

        let mut tx = Transaction::begin(&mut handle, "Cast Fire Bolt");
        tx.subtract(mp.clone(), 50, "spell cost").unwrap();
        tx.subtract(hp.clone(), 35, "fire damage").unwrap();

        // Another writer spends mana before this transaction validates.
        shared
            .0
            .borrow_mut()
            .get_character_mut(caster)
            .unwrap()
            .resources
            .mana
            .current = 40;

        let result = tx.validate();
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ValidationErrorKind::Desync);
        assert_eq!(result.errors[0].path, mp);
        assert_eq!(result.errors[0].expected, Some(StateValue::Int(80)));
        assert_eq!(result.errors[0].actual, Some(StateValue::Int(40)));
        assert!(!tx.changes()[0].validated);
        assert!(tx.changes()[1].validated);

        assert!(!tx.commit().unwrap());
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert!(tx.applied().is_empty());
        drop(tx);

        assert_eq!(shared.get(&mp), Some(StateValue::Int(40)));
        assert_eq!(shared.get(&hp), Some(StateValue::Int(100)));
    }

    #[test]
    fn test_range_violation_blocks_commit() {
        let mut arena = arena();
        let target = arena.target;
        let hp = hp(&arena);
        let constraints = ConstraintRegistry::new().with_pool_bounds(target);

        let mut tx =
            Transaction::begin(&mut arena.world, "Overheal").with_constraints(&constraints);
        tx.add(hp.clone(), 20, "potion").unwrap();
        assert!(!tx.commit().unwrap());
        let validation = tx.last_validation().unwrap();
        assert!(validation.has_kind(ValidationErrorKind::RangeViolation));
        assert_eq!(validation.errors_for(&hp).count(), 1);
        drop(tx);

        assert_eq!(arena.world.get(&hp), Some(StateValue::Int(100)));
    }

    #[test]
    fn test_calculation_error_on_pushed_change() {
        let mut arena = arena();
        let mp = mp(&arena);
        let before = arena.world.get(&mp);

        let mut tx = Transaction::begin(&mut arena.world, "Miscounted spell");
        tx.push_change(StateChange::new(
            mp.clone(),
            Operation::Subtract,
            before,
            StateValue::Int(20),
            Some(StateValue::Int(50)),
            "agent arithmetic",
        ))
        .unwrap();

        let result = tx.validate();
        assert!(result.has_kind(ValidationErrorKind::CalculationError));
        assert!(!tx.changes()[0].validated);
    }

    #[test]
    fn test_apply_fault_rolls_back_everything() {
        let arena = arena();
        let (mp, hp) = (mp(&arena), hp(&arena));
        let gold = StatePath::character(arena.caster, CharacterField::Gold);
        let mut store = FlakyStore::new(arena.world, &[3]);

        let mut tx = Transaction::begin(&mut store, "Triple effect");
        tx.subtract(mp.clone(), 50, "cost").unwrap();
        tx.subtract(hp.clone(), 35, "damage").unwrap();
        tx.add(gold.clone(), 10, "loot").unwrap();

        let err = tx.commit().unwrap_err();
        match err {
            TransactionError::Apply {
                path,
                rollback_failures,
                ..
            } => {
                assert_eq!(path, gold);
                assert!(rollback_failures.is_empty());
            }
            other => panic!("expected apply fault, got {:?}", other),
        }
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert!(tx.applied().is_empty());

        // The automatic rollback already ran; another one writes nothing.
        tx.rollback().unwrap();
        drop(tx);
        assert_eq!(store.sets, 5);

        assert_eq!(store.get(&mp), Some(StateValue::Int(80)));
        assert_eq!(store.get(&hp), Some(StateValue::Int(100)));
        assert_eq!(store.get(&gold), Some(StateValue::Int(0)));
    }

    #[test]
    fn test_failed_restore_is_reported() {
        let arena = arena();
        let (mp, hp) = (mp(&arena), hp(&arena));
        let gold = StatePath::character(arena.caster, CharacterField::Gold);
        // Write 3 is the gold apply, write 4 restores hp.
        let mut store = FlakyStore::new(arena.world, &[3, 4]);

        let mut tx = Transaction::begin(&mut store, "Triple effect");
        tx.subtract(mp.clone(), 50, "cost").unwrap();
        tx.subtract(hp.clone(), 35, "damage").unwrap();
        tx.add(gold, 10, "loot").unwrap();

        match tx.commit() {
            Err(TransactionError::Apply {
                rollback_failures, ..
            }) => {
                assert_eq!(rollback_failures.len(), 1);
                assert_eq!(rollback_failures[0].0, hp);
                assert!(matches!(rollback_failures[0].1, StoreError::Unavailable(_)));
            }
            other => panic!("expected apply fault, got {:?}", other),
        }
        drop(tx);

        assert_eq!(store.get(&mp), Some(StateValue::Int(80)));
        assert_eq!(store.get(&hp), Some(StateValue::Int(65)));
    }

    #[test]
    fn test_large_integer_desync_detected() {
        let arena = arena();
        let gold = StatePath::character(arena.caster, CharacterField::Gold);
        let shared = SharedWorld(Rc::new(RefCell::new(arena.world)));
        shared.0.borrow_mut().set(&gold, StateValue::Int(5_000_000_000)).unwrap();
        let mut handle = shared.clone();

        let mut tx = Transaction::begin(&mut handle, "Treasury interest");
        tx.add(gold.clone(), 10, "interest").unwrap();
        shared.0.borrow_mut().set(&gold, StateValue::Int(5_000_000_003)).unwrap();

        let result = tx.validate();
        assert!(result.has_kind(ValidationErrorKind::Desync));
        assert_eq!(result.errors_for(&gold).count(), 1);
        assert!(!tx.commit().unwrap());
        drop(tx);

        assert_eq!(shared.get(&gold), Some(StateValue::Int(5_000_000_003)));
    }

    #[test]
    fn test_close_float_desync_detected() {
        let arena = arena();
        let danger = StatePath::world(WorldField::DangerLevel);
        let shared = SharedWorld(Rc::new(RefCell::new(arena.world)));
        shared.0.borrow_mut().set(&danger, StateValue::Float(0.3)).unwrap();
        let mut handle = shared.clone();

        let mut tx = Transaction::begin(&mut handle, "Rising threat");
        tx.add(danger.clone(), 0.1, "ambush").unwrap();
        shared.0.borrow_mut().set(&danger, StateValue::Float(0.300001)).unwrap();

        assert!(tx.validate().has_kind(ValidationErrorKind::Desync));
        assert!(!tx.commit().unwrap());
        drop(tx);

        assert_eq!(shared.get(&danger), Some(StateValue::Float(0.300001)));
    }

    #[test]
    fn test_invalid_value_fault_rolls_back() {
        let mut arena = arena();
        let danger = StatePath::world(WorldField::DangerLevel);
        let weather = StatePath::world(WorldField::Weather);

        let mut tx = Transaction::begin(&mut arena.world, "Summon blizzard");
        tx.set(danger.clone(), 0.9, "ominous").unwrap();
        tx.set(weather.clone(), "blizzard", "not a real weather").unwrap();

        assert!(matches!(tx.commit(), Err(TransactionError::Apply { .. })));
        drop(tx);

        assert_eq!(arena.world.get(&danger), Some(StateValue::Float(0.0)));
        assert_eq!(arena.world.get(&weather), Some(StateValue::from("clear")));
    }

    #[test]
    fn test_rollback_restores_absent_values() {
        let mut arena = arena();
        let goal = StatePath::character(arena.caster, CharacterField::CurrentGoal);
        let mp = mp(&arena);
        let mut store = FlakyStore::new(arena.world, &[2]);

        let mut tx = Transaction::begin(&mut store, "New quest");
        tx.set(goal.clone(), "Slay the wyrm", "quest accepted").unwrap();
        tx.subtract(mp, 10, "oath magic").unwrap();
        assert!(tx.commit().is_err());
        drop(tx);

        assert_eq!(store.get(&goal), None);
    }

    #[test]
    fn test_rollback_is_idempotent() {
        let mut arena = arena();
        let mp = mp(&arena);

        let mut tx = Transaction::begin(&mut arena.world, "Abandoned cast");
        tx.subtract(mp.clone(), 10, "cost").unwrap();
        tx.rollback().unwrap();
        tx.rollback().unwrap();
        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert!(matches!(tx.commit(), Err(TransactionError::Finished { .. })));
        assert!(matches!(
            tx.add(mp.clone(), 1, "late"),
            Err(TransactionError::Finished { .. })
        ));
        drop(tx);

        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(80)));
    }

    #[test]
    fn test_terminal_committed_rejects_further_calls() {
        let mut arena = arena();
        let mp = mp(&arena);

        let mut tx = Transaction::begin(&mut arena.world, "Cantrip");
        tx.subtract(mp, 1, "cost").unwrap();
        assert!(tx.commit().unwrap());
        assert!(matches!(tx.commit(), Err(TransactionError::Finished { .. })));
        assert!(matches!(tx.rollback(), Err(TransactionError::Finished { .. })));
    }

    #[test]
    fn test_same_path_rereads_store() {
        let mut arena = arena();
        let mp = mp(&arena);

        let mut tx = Transaction::begin(&mut arena.world, "Double cast");
        tx.subtract(mp.clone(), 10, "first").unwrap();
        tx.subtract(mp.clone(), 20, "second").unwrap();
        assert_eq!(tx.changes()[1].before, Some(StateValue::Int(80)));
        assert!(tx.commit().unwrap());
        drop(tx);

        // Last write wins: 80 - 20.
        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(60)));
    }

    #[test]
    fn test_type_mismatch_on_queue() {
        let mut arena = arena();
        let mut tx = Transaction::begin(&mut arena.world, "Nonsense");
        let err = tx
            .add(StatePath::world(WorldField::Weather), 3, "weather arithmetic")
            .unwrap_err();
        assert!(matches!(err, TransactionError::TypeMismatch { operation: Operation::Add, .. }));
        assert!(tx.changes().is_empty());
    }

    #[test]
    fn test_list_operations_commit() {
        let mut arena = arena();
        let inventory = StatePath::character(arena.caster, CharacterField::Inventory);

        let mut tx = Transaction::begin(&mut arena.world, "Loot");
        tx.append(inventory.clone(), "amulet", "found in chest").unwrap();
        assert!(tx.commit().unwrap());
        drop(tx);

        let mut tx = Transaction::begin(&mut arena.world, "Sell");
        tx.remove(inventory.clone(), "amulet", "sold").unwrap();
        tx.multiply(StatePath::world(WorldField::DangerLevel), 2.0, "no-op doubling").unwrap();
        assert!(tx.commit().unwrap());
        drop(tx);

        assert_eq!(arena.world.get(&inventory), Some(StateValue::List(vec![])));
    }

    #[test]
    fn test_run_auto_commits() {
        let mut arena = arena();
        let mp = mp(&arena);

        let spent: Result<i64, TransactionError> =
            Transaction::begin(&mut arena.world, "Scoped cast").run(|tx| {
                tx.subtract(mp.clone(), 25, "cost")?;
                Ok(25)
            });

        assert_eq!(spent.unwrap(), 25);
        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(55)));
    }

    #[test]
    fn test_run_rolls_back_on_error() {
        #[derive(Debug)]
        enum CastError {
            Fizzled,
            Tx(TransactionError),
        }
        impl From<TransactionError> for CastError {
            fn from(err: TransactionError) -> Self {
                CastError::Tx(err)
            }
        }

        let mut arena = arena();
        let mp = mp(&arena);

        let outcome: Result<(), CastError> =
            Transaction::begin(&mut arena.world, "Fizzle").run(|tx| {
                tx.subtract(mp.clone(), 25, "cost")?;
                Err(CastError::Fizzled)
            });

        assert!(matches!(outcome, Err(CastError::Fizzled)));
        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(80)));
    }

    #[test]
    fn test_run_surfaces_rejection() {
        let mut arena = arena();
        let mp = mp(&arena);
        let constraints = ConstraintRegistry::new().with(mp.clone(), Constraint::at_least(0.0));

        let outcome: Result<(), TransactionError> = Transaction::begin(&mut arena.world, "Overdraw")
            .with_constraints(&constraints)
            .run(|tx| tx.subtract(mp.clone(), 500, "cost"));

        match outcome {
            Err(TransactionError::Rejected(result)) => {
                assert!(result.has_kind(ValidationErrorKind::RangeViolation))
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(arena.world.get(&mp), Some(StateValue::Int(80)));
    }
}
