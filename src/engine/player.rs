//! Player state: current location and carried objects.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::types::GameObject;

/// The player: a position in the location graph plus an inventory keyed by
/// object id. Objects keep their identity when they move between a location
/// and the inventory; they are never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    location: String,
    inventory: HashMap<String, GameObject>,
}

impl Player {
    pub fn new(starting_inventory: HashMap<String, GameObject>, starting_location: &str) -> Self {
        Self {
            location: starting_location.to_string(),
            inventory: starting_inventory,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = location.to_string();
    }

    /// Whether `query` names an inventory object by id or display name.
    /// Name comparison is exact; the caller passes lower-cased input, so a
    /// name only matches when authored lower-case.
    pub fn in_inventory(&self, query: &str) -> bool {
        self.inventory_id(query).is_some()
    }

    /// Resolve a query to the id of a carried object, id before name.
    pub fn inventory_id(&self, query: &str) -> Option<&str> {
        if let Some((id, _)) = self.inventory.get_key_value(query) {
            return Some(id.as_str());
        }
        self.inventory
            .iter()
            .find(|(_, object)| object.name == query)
            .map(|(id, _)| id.as_str())
    }

    pub fn item(&self, id: &str) -> Option<&GameObject> {
        self.inventory.get(id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut GameObject> {
        self.inventory.get_mut(id)
    }

    pub fn add_item(&mut self, id: &str, object: GameObject) {
        self.inventory.insert(id.to_string(), object);
    }

    pub fn remove_item(&mut self, id: &str) -> Option<GameObject> {
        self.inventory.remove(id)
    }

    pub fn inventory(&self) -> &HashMap<String, GameObject> {
        &self.inventory
    }

    /// Replace the whole inventory (used when restoring a save).
    pub fn set_inventory(&mut self, inventory: HashMap<String, GameObject>) {
        self.inventory = inventory;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str) -> GameObject {
        GameObject {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn lookup_matches_id_before_name() {
        let mut player = Player::new(HashMap::new(), "den");
        player.add_item("brass key", object("shiny thing"));
        player.add_item("decoy", object("brass key"));

        // "brass key" is both an id and another object's name; id wins
        assert_eq!(player.inventory_id("brass key"), Some("brass key"));
        assert_eq!(player.inventory_id("shiny thing"), Some("brass key"));
        assert_eq!(player.inventory_id("missing"), None);
    }

    #[test]
    fn items_move_in_and_out() {
        let mut player = Player::new(HashMap::new(), "den");
        player.add_item("rope", object("rope"));
        assert!(player.in_inventory("rope"));

        let removed = player.remove_item("rope").unwrap();
        assert_eq!(removed.name, "rope");
        assert!(!player.in_inventory("rope"));
    }
}
