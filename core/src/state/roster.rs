use crate::combat_log::{Entity, EntityKey};
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of entities, deduplicated by identity key.
/// Serializes as a plain array; the key index is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Entity>", into = "Vec<Entity>")]
pub struct Roster {
    entries: Vec<Entity>,
    index: HashMap<EntityKey, usize>,
}

impl Roster {
    /// Insert unless the identity key is already present. Entities with no
    /// identity (self-references, empty fields) are ignored. Returns true
    /// when the entity was added.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let Some(key) = entity.unique() else {
            return false;
        };
        match self.index.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(entity);
                true
            }
        }
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl From<Vec<Entity>> for Roster {
    fn from(entries: Vec<Entity>) -> Self {
        let mut roster = Roster::default();
        for entity in entries {
            roster.insert(entity);
        }
        roster
    }
}

impl From<Roster> for Vec<Entity> {
    fn from(roster: Roster) -> Self {
        roster.entries
    }
}
