//! Addressable fields of the game state.
//!
//! Every value a transaction may touch is named by a [`StatePath`]. The set is
//! closed: adding a field means adding a variant, and every store must handle
//! it.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::{Ability, EntityId, ResourceKind};
use crate::error::PathParseError;

/// Which half of a resource pool a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolBound {
    Current,
    Max,
}

impl PoolBound {
    pub fn key(&self) -> &'static str {
        match self {
            PoolBound::Current => "current",
            PoolBound::Max => "max",
        }
    }
}

/// Non-resource fields of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterField {
    Level,
    Experience,
    Gold,
    Ability(Ability),
    Inventory,
    Conditions,
    CurrentGoal,
}

impl CharacterField {
    pub fn key(&self) -> &'static str {
        match self {
            CharacterField::Level => "level",
            CharacterField::Experience => "xp",
            CharacterField::Gold => "gold",
            CharacterField::Ability(ability) => ability.key(),
            CharacterField::Inventory => "inventory",
            CharacterField::Conditions => "conditions",
            CharacterField::CurrentGoal => "goal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let field = match key {
            "level" => CharacterField::Level,
            "xp" => CharacterField::Experience,
            "gold" => CharacterField::Gold,
            "inventory" => CharacterField::Inventory,
            "conditions" => CharacterField::Conditions,
            "goal" => CharacterField::CurrentGoal,
            other => CharacterField::Ability(Ability::from_key(other)?),
        };
        Some(field)
    }
}

/// Fields of the shared world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorldField {
    Day,
    Hour,
    DangerLevel,
    Weather,
    Events,
}

impl WorldField {
    pub const ALL: [WorldField; 5] = [
        WorldField::Day,
        WorldField::Hour,
        WorldField::DangerLevel,
        WorldField::Weather,
        WorldField::Events,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            WorldField::Day => "day",
            WorldField::Hour => "hour",
            WorldField::DangerLevel => "danger_level",
            WorldField::Weather => "weather",
            WorldField::Events => "events",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

/// Address of a single value in the game state.
///
/// Renders as a dotted string (`character.<id>.hp.current`,
/// `character.<id>.gold`, `world.danger_level`) and parses back from the same
/// form, which is also its serde representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StatePath {
    Resource {
        owner: EntityId,
        pool: ResourceKind,
        bound: PoolBound,
    },
    Character {
        owner: EntityId,
        field: CharacterField,
    },
    World(WorldField),
}

impl StatePath {
    /// Current value of a resource pool.
    pub fn current(owner: EntityId, pool: ResourceKind) -> Self {
        StatePath::Resource {
            owner,
            pool,
            bound: PoolBound::Current,
        }
    }

    /// Maximum value of a resource pool.
    pub fn max(owner: EntityId, pool: ResourceKind) -> Self {
        StatePath::Resource {
            owner,
            pool,
            bound: PoolBound::Max,
        }
    }

    pub fn character(owner: EntityId, field: CharacterField) -> Self {
        StatePath::Character { owner, field }
    }

    pub fn world(field: WorldField) -> Self {
        StatePath::World(field)
    }
}

impl std::fmt::Display for StatePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatePath::Resource { owner, pool, bound } => {
                write!(f, "character.{}.{}.{}", owner, pool.key(), bound.key())
            }
            StatePath::Character { owner, field } => {
                write!(f, "character.{}.{}", owner, field.key())
            }
            StatePath::World(field) => write!(f, "world.{}", field.key()),
        }
    }
}

impl FromStr for StatePath {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || PathParseError::Unknown(s.to_string());
        let segments: Vec<&str> = s.split('.').collect();

        match segments.as_slice() {
            ["world", field] => WorldField::from_key(field)
                .map(StatePath::World)
                .ok_or_else(unknown),
            ["character", id, rest @ ..] => {
                let owner: EntityId = id.parse().map_err(|_| PathParseError::InvalidEntity {
                    path: s.to_string(),
                    id: id.to_string(),
                })?;
                match rest {
                    [pool, bound] => {
                        let pool = ResourceKind::from_key(pool).ok_or_else(unknown)?;
                        let bound = match *bound {
                            "current" => PoolBound::Current,
                            "max" => PoolBound::Max,
                            _ => return Err(unknown()),
                        };
                        Ok(StatePath::Resource { owner, pool, bound })
                    }
                    [field] => CharacterField::from_key(field)
                        .map(|field| StatePath::Character { owner, field })
                        .ok_or_else(unknown),
                    _ => Err(unknown()),
                }
            }
            _ => Err(unknown()),
        }
    }
}

impl From<StatePath> for String {
    fn from(path: StatePath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for StatePath {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_path_display() {
        let owner = EntityId::new();
        let path = StatePath::current(owner, ResourceKind::Mana);
        assert_eq!(path.to_string(), format!("character.{}.mp.current", owner));
    }

    #[test]
    fn test_parse_every_shape() {
        let owner = EntityId::new();
        let paths = [
            StatePath::current(owner, ResourceKind::Hp),
            StatePath::max(owner, ResourceKind::Stamina),
            StatePath::character(owner, CharacterField::Gold),
            StatePath::character(owner, CharacterField::Ability(Ability::Charisma)),
            StatePath::character(owner, CharacterField::CurrentGoal),
            StatePath::world(WorldField::DangerLevel),
        ];
        for path in paths {
            let parsed: StatePath = path.to_string().parse().unwrap();
            assert_eq!(parsed, path);
        }
    }

    #[test]
    fn test_unknown_paths_are_errors() {
        assert!(matches!(
            "world.mood".parse::<StatePath>(),
            Err(PathParseError::Unknown(_))
        ));
        assert!(matches!(
            "character.bob.hp.current".parse::<StatePath>(),
            Err(PathParseError::InvalidEntity { .. })
        ));
        let owner = EntityId::new();
        assert!(format!("character.{}.hp.half", owner).parse::<StatePath>().is_err());
        assert!("".parse::<StatePath>().is_err());
    }

    #[test]
    fn test_serde_uses_dotted_form() {
        let path = StatePath::world(WorldField::Weather);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"world.weather\"");
        let back: StatePath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
