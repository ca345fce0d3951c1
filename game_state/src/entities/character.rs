//! Character definitions.

use serde::{Deserialize, Serialize};

use super::{AbilityScores, EntityId, ResourcePool, ResourcesComponent};

/// A full character definition with all addressable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,

    pub abilities: AbilityScores,
    pub resources: ResourcesComponent,

    pub level: i64,
    pub experience: i64,
    pub gold: i64,

    /// Item names carried by the character.
    pub inventory: Vec<String>,
    /// Free-form condition labels ("poisoned", "blessed").
    pub conditions: Vec<String>,
    pub current_goal: Option<String>,
}

impl Character {
    /// Create a new character with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            abilities: AbilityScores::default(),
            resources: ResourcesComponent::default(),
            level: 1,
            experience: 0,
            gold: 0,
            inventory: Vec::new(),
            conditions: Vec::new(),
            current_goal: None,
        }
    }

    /// Set hit points, starting full.
    pub fn with_hp(mut self, max: i64) -> Self {
        self.resources.hp = ResourcePool::full(max);
        self
    }

    /// Set mana, starting full.
    pub fn with_mana(mut self, max: i64) -> Self {
        self.resources.mana = ResourcePool::full(max);
        self
    }
}
