//! An owned store plus its constraints, handing out transactions.

use super::Transaction;
use crate::constraints::ConstraintRegistry;
use crate::error::TransactionError;
use crate::state::StateStore;

/// Owns a store and the constraints every transaction on it is checked
/// against. One engine serves one campaign's single mutation stream.
#[derive(Debug, Default)]
pub struct TransactionEngine<S> {
    store: S,
    constraints: ConstraintRegistry,
}

impl<S: StateStore> TransactionEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_constraints(store, ConstraintRegistry::new())
    }

    pub fn with_constraints(store: S, constraints: ConstraintRegistry) -> Self {
        Self { store, constraints }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access, bypassing transactions.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    pub fn constraints_mut(&mut self) -> &mut ConstraintRegistry {
        &mut self.constraints
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Open a pending transaction checked against this engine's constraints.
    pub fn begin(&mut self, description: impl Into<String>) -> Transaction<'_, S> {
        Transaction::begin(&mut self.store, description).with_constraints(&self.constraints)
    }

    /// Run `body` in a fresh transaction; see [`Transaction::run`].
    pub fn scoped<T, E, F>(&mut self, description: impl Into<String>, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_, S>) -> Result<T, E>,
        E: From<TransactionError>,
    {
        self.begin(description).run(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Character, ResourceKind};
    use crate::state::{StatePath, StateValue};
    use crate::transaction::TransactionState;
    use crate::world_state::WorldState;

    #[test]
    fn test_engine_applies_pool_bounds() {
        let mut world = WorldState::new();
        let hero = world.add_character(Character::new("Hero").with_hp(40));
        let mut engine = TransactionEngine::new(world);
        engine.constraints_mut().add_pool_bounds(hero);
        let hp = StatePath::current(hero, ResourceKind::Hp);

        let mut tx = engine.begin("Fall into pit");
        tx.subtract(hp.clone(), 50, "spikes").unwrap();
        assert!(!tx.commit().unwrap());
        drop(tx);

        let mut tx = engine.begin("Stub toe");
        tx.subtract(hp.clone(), 5, "rock").unwrap();
        assert!(tx.commit().unwrap());
        assert_eq!(tx.state(), TransactionState::Committed);
        drop(tx);

        assert_eq!(engine.store().get(&hp), Some(StateValue::Int(35)));
    }

    #[test]
    fn test_engine_scoped() {
        let mut world = WorldState::new();
        let hero = world.add_character(Character::new("Hero").with_mana(20));
        let mut engine = TransactionEngine::new(world);
        let mp = StatePath::current(hero, ResourceKind::Mana);

        engine
            .scoped("Light", |tx| -> Result<(), TransactionError> {
                tx.subtract(mp.clone(), 2, "cantrip")
            })
            .unwrap();

        let world = engine.into_store();
        assert_eq!(world.get_character(hero).unwrap().resources.mana.current, 18);
    }
}
