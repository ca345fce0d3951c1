//! Component definitions for entities.

use serde::{Deserialize, Serialize};

/// Ability scores for characters and creatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i64,
    pub dexterity: i64,
    pub constitution: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// The six abilities, used to address a single score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Dexterity,
        Ability::Constitution,
        Ability::Intelligence,
        Ability::Wisdom,
        Ability::Charisma,
    ];

    /// Short lowercase key used in dotted paths ("str", "dex", ...).
    pub fn key(&self) -> &'static str {
        match self {
            Ability::Strength => "str",
            Ability::Dexterity => "dex",
            Ability::Constitution => "con",
            Ability::Intelligence => "int",
            Ability::Wisdom => "wis",
            Ability::Charisma => "cha",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }
}

impl AbilityScores {
    pub fn score(&self, ability: Ability) -> i64 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn score_mut(&mut self, ability: Ability) -> &mut i64 {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }
}

/// A depletable resource: hit points, mana, stamina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub current: i64,
    pub max: i64,
}

impl ResourcePool {
    /// A pool that starts full.
    pub fn full(max: i64) -> Self {
        Self { current: max, max }
    }
}

/// Which resource pool a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Hp,
    Mana,
    Stamina,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Hp,
        ResourceKind::Mana,
        ResourceKind::Stamina,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ResourceKind::Hp => "hp",
            ResourceKind::Mana => "mp",
            ResourceKind::Stamina => "sp",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

/// The three resource pools every character carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesComponent {
    pub hp: ResourcePool,
    pub mana: ResourcePool,
    pub stamina: ResourcePool,
}

impl Default for ResourcesComponent {
    fn default() -> Self {
        Self {
            hp: ResourcePool::full(10),
            mana: ResourcePool::full(0),
            stamina: ResourcePool::full(10),
        }
    }
}

impl ResourcesComponent {
    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        match kind {
            ResourceKind::Hp => &self.hp,
            ResourceKind::Mana => &self.mana,
            ResourceKind::Stamina => &self.stamina,
        }
    }

    pub fn pool_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        match kind {
            ResourceKind::Hp => &mut self.hp,
            ResourceKind::Mana => &mut self.mana,
            ResourceKind::Stamina => &mut self.stamina,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_keys_round_trip() {
        for ability in Ability::ALL {
            assert_eq!(Ability::from_key(ability.key()), Some(ability));
        }
        assert_eq!(Ability::from_key("luck"), None);
    }

    #[test]
    fn test_score_mut_writes_through() {
        let mut scores = AbilityScores::default();
        *scores.score_mut(Ability::Wisdom) = 16;
        assert_eq!(scores.wisdom, 16);
        assert_eq!(scores.score(Ability::Wisdom), 16);
    }

    #[test]
    fn test_default_pools() {
        let resources = ResourcesComponent::default();
        assert_eq!(resources.pool(ResourceKind::Hp).current, 10);
        assert_eq!(resources.pool(ResourceKind::Mana).current, 0);
    }
}
