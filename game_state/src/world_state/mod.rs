//! World state management - the central structure holding all game data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Character, EntityId};
use crate::error::StoreError;
use crate::state::{CharacterField, PoolBound, StatePath, StateStore, StateValue, WorldField};

/// World time tracking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct WorldTime {
    pub day: u32,
    pub hour: u8,
}

/// Weather conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
}

impl Weather {
    pub const ALL: [Weather; 6] = [
        Weather::Clear,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Snowy,
        Weather::Foggy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Stormy => "stormy",
            Weather::Snowy => "snowy",
            Weather::Foggy => "foggy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|w| w.name().eq_ignore_ascii_case(name))
    }
}

/// The complete state of one campaign's world at any point in time.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldState {
    pub time: WorldTime,

    pub weather: Weather,

    /// Ambient danger level, nominally 0.0 to 1.0.
    pub danger_level: f64,

    /// Notable world events, oldest first.
    pub events: Vec<String>,

    /// All characters in the world (including player).
    pub characters: HashMap<EntityId, Character>,
}

impl WorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get character by ID.
    pub fn get_character(&self, id: EntityId) -> Option<&Character> {
        self.characters.get(&id)
    }

    /// Get mutable character by ID.
    pub fn get_character_mut(&mut self, id: EntityId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    /// Add a character to the world.
    pub fn add_character(&mut self, character: Character) -> EntityId {
        let id = character.id;
        self.characters.insert(id, character);
        id
    }

    fn character_for(
        &mut self,
        path: &StatePath,
        owner: EntityId,
    ) -> Result<&mut Character, StoreError> {
        self.characters
            .get_mut(&owner)
            .ok_or_else(|| StoreError::UnknownEntity {
                path: path.clone(),
                entity: owner.to_string(),
            })
    }
}

fn text_list(items: &[String]) -> StateValue {
    StateValue::List(items.iter().cloned().map(StateValue::Text).collect())
}

fn expect_int(path: &StatePath, value: &StateValue) -> Result<i64, StoreError> {
    value
        .as_i64()
        .ok_or_else(|| StoreError::invalid_value(path, value, "expected a whole number"))
}

fn expect_text_list(path: &StatePath, value: &StateValue) -> Result<Vec<String>, StoreError> {
    let items = value
        .as_list()
        .ok_or_else(|| StoreError::invalid_value(path, value, "expected a list"))?;
    items
        .iter()
        .map(|item| {
            item.as_text()
                .map(str::to_string)
                .ok_or_else(|| StoreError::invalid_value(path, value, "list items must be text"))
        })
        .collect()
}

impl StateStore for WorldState {
    fn get(&self, path: &StatePath) -> Option<StateValue> {
        match path {
            StatePath::Resource { owner, pool, bound } => {
                let pool = self.characters.get(owner)?.resources.pool(*pool);
                Some(StateValue::Int(match bound {
                    PoolBound::Current => pool.current,
                    PoolBound::Max => pool.max,
                }))
            }
            StatePath::Character { owner, field } => {
                let character = self.characters.get(owner)?;
                match field {
                    CharacterField::Level => Some(StateValue::Int(character.level)),
                    CharacterField::Experience => Some(StateValue::Int(character.experience)),
                    CharacterField::Gold => Some(StateValue::Int(character.gold)),
                    CharacterField::Ability(ability) => {
                        Some(StateValue::Int(character.abilities.score(*ability)))
                    }
                    CharacterField::Inventory => Some(text_list(&character.inventory)),
                    CharacterField::Conditions => Some(text_list(&character.conditions)),
                    CharacterField::CurrentGoal => {
                        character.current_goal.clone().map(StateValue::Text)
                    }
                }
            }
            StatePath::World(field) => Some(match field {
                WorldField::Day => StateValue::Int(self.time.day as i64),
                WorldField::Hour => StateValue::Int(self.time.hour as i64),
                WorldField::DangerLevel => StateValue::Float(self.danger_level),
                WorldField::Weather => StateValue::Text(self.weather.name().to_string()),
                WorldField::Events => text_list(&self.events),
            }),
        }
    }

    fn set(&mut self, path: &StatePath, value: StateValue) -> Result<(), StoreError> {
        match path {
            StatePath::Resource { owner, pool, bound } => {
                let amount = expect_int(path, &value)?;
                let pool = self.character_for(path, *owner)?.resources.pool_mut(*pool);
                match bound {
                    PoolBound::Current => pool.current = amount,
                    PoolBound::Max => pool.max = amount,
                }
            }
            StatePath::Character { owner, field } => {
                let field = *field;
                let character = self.character_for(path, *owner)?;
                match field {
                    CharacterField::Level => character.level = expect_int(path, &value)?,
                    CharacterField::Experience => character.experience = expect_int(path, &value)?,
                    CharacterField::Gold => character.gold = expect_int(path, &value)?,
                    CharacterField::Ability(ability) => {
                        *character.abilities.score_mut(ability) = expect_int(path, &value)?
                    }
                    CharacterField::Inventory => {
                        character.inventory = expect_text_list(path, &value)?
                    }
                    CharacterField::Conditions => {
                        character.conditions = expect_text_list(path, &value)?
                    }
                    CharacterField::CurrentGoal => {
                        let goal = value.as_text().ok_or_else(|| {
                            StoreError::invalid_value(path, &value, "expected text")
                        })?;
                        character.current_goal = Some(goal.to_string());
                    }
                }
            }
            StatePath::World(field) => match field {
                WorldField::Day => {
                    let day = expect_int(path, &value)?;
                    self.time.day = u32::try_from(day)
                        .map_err(|_| StoreError::invalid_value(path, &value, "day out of range"))?;
                }
                WorldField::Hour => {
                    let hour = expect_int(path, &value)?;
                    self.time.hour = u8::try_from(hour)
                        .ok()
                        .filter(|h| *h < 24)
                        .ok_or_else(|| {
                            StoreError::invalid_value(path, &value, "hour must be 0-23")
                        })?;
                }
                WorldField::DangerLevel => {
                    self.danger_level = value.as_f64().ok_or_else(|| {
                        StoreError::invalid_value(path, &value, "expected a number")
                    })?;
                }
                WorldField::Weather => {
                    self.weather = value
                        .as_text()
                        .and_then(Weather::from_name)
                        .ok_or_else(|| StoreError::invalid_value(path, &value, "unknown weather"))?;
                }
                WorldField::Events => self.events = expect_text_list(path, &value)?,
            },
        }
        Ok(())
    }

    fn clear(&mut self, path: &StatePath) -> Result<(), StoreError> {
        match path {
            StatePath::Character {
                owner,
                field: CharacterField::CurrentGoal,
            } => {
                self.character_for(path, *owner)?.current_goal = None;
                Ok(())
            }
            _ => Err(StoreError::NotClearable(path.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Ability, ResourceKind};

    #[test]
    fn test_add_character() {
        let mut state = WorldState::new();
        let character = Character::new("Test Hero");
        let id = character.id;

        state.add_character(character);

        assert!(state.get_character(id).is_some());
        assert_eq!(state.get_character(id).unwrap().name, "Test Hero");
    }

    #[test]
    fn test_resource_paths_read_and_write() {
        let mut state = WorldState::new();
        let id = state.add_character(Character::new("Mage").with_mana(80));
        let path = StatePath::current(id, ResourceKind::Mana);

        assert_eq!(state.get(&path), Some(StateValue::Int(80)));
        state.set(&path, StateValue::Int(30)).unwrap();
        assert_eq!(state.get_character(id).unwrap().resources.mana.current, 30);
        assert_eq!(state.get(&StatePath::max(id, ResourceKind::Mana)), Some(StateValue::Int(80)));
    }

    #[test]
    fn test_float_with_fraction_rejected_for_pools() {
        let mut state = WorldState::new();
        let id = state.add_character(Character::new("Knight"));
        let err = state
            .set(&StatePath::current(id, ResourceKind::Hp), StateValue::Float(2.5))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_character() {
        let mut state = WorldState::new();
        let ghost = EntityId::new();
        let path = StatePath::character(ghost, CharacterField::Gold);
        assert_eq!(state.get(&path), None);
        assert!(matches!(
            state.set(&path, StateValue::Int(5)),
            Err(StoreError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn test_character_fields() {
        let mut state = WorldState::new();
        let id = state.add_character(Character::new("Rogue"));

        state
            .set(
                &StatePath::character(id, CharacterField::Inventory),
                StateValue::List(vec!["lockpick".into(), "dagger".into()]),
            )
            .unwrap();
        state
            .set(&StatePath::character(id, CharacterField::Ability(Ability::Dexterity)), 17.into())
            .unwrap();

        let rogue = state.get_character(id).unwrap();
        assert_eq!(rogue.inventory, vec!["lockpick", "dagger"]);
        assert_eq!(rogue.abilities.dexterity, 17);
    }

    #[test]
    fn test_goal_can_be_set_and_cleared() {
        let mut state = WorldState::new();
        let id = state.add_character(Character::new("Paladin"));
        let path = StatePath::character(id, CharacterField::CurrentGoal);

        assert_eq!(state.get(&path), None);
        state.set(&path, "Find the relic".into()).unwrap();
        assert_eq!(state.get(&path), Some(StateValue::from("Find the relic")));
        state.clear(&path).unwrap();
        assert_eq!(state.get(&path), None);
    }

    #[test]
    fn test_world_fields() {
        let mut state = WorldState::new();

        state.set(&StatePath::world(WorldField::Weather), "Stormy".into()).unwrap();
        assert_eq!(state.weather, Weather::Stormy);

        assert!(state.set(&StatePath::world(WorldField::Weather), "blizzard".into()).is_err());
        assert!(state.set(&StatePath::world(WorldField::Hour), 24.into()).is_err());
        assert!(state.clear(&StatePath::world(WorldField::Day)).is_err());

        state.set(&StatePath::world(WorldField::DangerLevel), 0.4.into()).unwrap();
        assert_eq!(
            state.get(&StatePath::world(WorldField::DangerLevel)),
            Some(StateValue::Float(0.4))
        );
    }
}
