//! Entity resolution and dependency evaluation.
//!
//! A query is whatever noun phrase the parser extracted: an object id or a
//! display name. Resolution searches the inventory first, then the current
//! location, so carried objects shadow same-named scenery. Within each scope
//! an id match beats a display-name match.

use log::debug;

use crate::engine::player::Player;
use crate::engine::types::{GameObject, Location};

/// Where a resolved object lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectScope {
    Inventory,
    Location,
}

/// A resolved object: its id plus the scope that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub id: String,
    pub scope: ObjectScope,
}

/// Resolve a query against the inventory, then the current location.
///
/// Inventory names match exactly (input is already lower-cased, so only
/// lower-case authored names match); location names match with the name
/// lower-cased. No side effects.
pub fn resolve_object(player: &Player, location: &Location, query: &str) -> Option<ObjectRef> {
    if let Some(id) = player.inventory_id(query) {
        debug!("resolved '{}' to inventory object '{}'", query, id);
        return Some(ObjectRef {
            id: id.to_string(),
            scope: ObjectScope::Inventory,
        });
    }
    // within the location too, an id match always beats a name match
    if let Some((id, _)) = location.objects.get_key_value(query) {
        debug!("resolved '{}' to location object '{}'", query, id);
        return Some(ObjectRef {
            id: id.clone(),
            scope: ObjectScope::Location,
        });
    }
    for (id, object) in &location.objects {
        if object.name.to_lowercase() == query {
            debug!("resolved '{}' to location object '{}'", query, id);
            return Some(ObjectRef {
                id: id.clone(),
                scope: ObjectScope::Location,
            });
        }
    }
    debug!("'{}' did not resolve in either scope", query);
    None
}

/// Fetch the object an [`ObjectRef`] points at.
pub fn object<'a>(player: &'a Player, location: &'a Location, r: &ObjectRef) -> Option<&'a GameObject> {
    match r.scope {
        ObjectScope::Inventory => player.item(&r.id),
        ObjectScope::Location => location.objects.get(&r.id),
    }
}

/// Check whether a query's single-hop prerequisite is satisfied.
///
/// If the query resolves to an object, its `depends_on` (when non-empty)
/// names an object in the *current location's* object map whose `is_used`
/// flag gates it. If the query is instead a direction key, the same rule
/// applies to the direction's `depends_on`. An empty `depends_on` is
/// vacuously resolved. Never mutates state; safe to call repeatedly.
pub fn dependency_resolved(player: &Player, location: &Location, query: &str) -> bool {
    if let Some(r) = resolve_object(player, location, query) {
        let Some(obj) = object(player, location, &r) else {
            return false;
        };
        return gate_open(location, &obj.depends_on);
    }
    if let Some(exit) = location.directions.get(query) {
        return gate_open(location, &exit.depends_on);
    }
    debug!("dependency query '{}' is neither object nor direction", query);
    true
}

/// Evaluate a `depends_on` value against the location's objects.
fn gate_open(location: &Location, depends_on: &str) -> bool {
    if depends_on.is_empty() {
        return true;
    }
    match location.objects.get(depends_on) {
        Some(gate) => gate.is_used,
        None => {
            // data-integrity hole: the gating object is not in this
            // location, so the gate can never open here
            log::warn!(
                "dependency '{}' not found in location objects; treating as unresolved",
                depends_on
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn location_with(objects: Vec<(&str, GameObject)>) -> Location {
        Location {
            name: "Test Room".into(),
            objects: objects
                .into_iter()
                .map(|(id, o)| (id.to_string(), o))
                .collect(),
            ..Default::default()
        }
    }

    fn named(name: &str) -> GameObject {
        GameObject {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn inventory_shadows_location() {
        let mut player = Player::new(HashMap::new(), "room");
        player.add_item("lamp", named("lamp"));
        let location = location_with(vec![("lamp", named("lamp"))]);

        let r = resolve_object(&player, &location, "lamp").unwrap();
        assert_eq!(r.scope, ObjectScope::Inventory);
    }

    #[test]
    fn id_match_beats_name_match_within_the_location() {
        let player = Player::new(HashMap::new(), "room");
        // one object's id collides with another object's display name
        let location = location_with(vec![("lamp", named("old lamp")), ("stub", named("lamp"))]);

        let r = resolve_object(&player, &location, "lamp").unwrap();
        assert_eq!(r.id, "lamp");
    }

    #[test]
    fn location_names_match_case_insensitively() {
        let player = Player::new(HashMap::new(), "room");
        let location = location_with(vec![("bed_1", named("Huge Bed"))]);

        let r = resolve_object(&player, &location, "huge bed").unwrap();
        assert_eq!(r.id, "bed_1");
        assert_eq!(r.scope, ObjectScope::Location);
    }

    #[test]
    fn empty_dependency_is_always_resolved() {
        let player = Player::new(HashMap::new(), "room");
        let location = location_with(vec![("chair", named("chair"))]);
        assert!(dependency_resolved(&player, &location, "chair"));
    }

    #[test]
    fn dependency_follows_is_used_flag() {
        let player = Player::new(HashMap::new(), "room");
        let mut lever = named("lever");
        lever.is_used = false;
        let mut door = named("door");
        door.depends_on = "lever".into();
        let mut location = location_with(vec![("lever", lever), ("door", door)]);

        assert!(!dependency_resolved(&player, &location, "door"));
        location.objects.get_mut("lever").unwrap().is_used = true;
        assert!(dependency_resolved(&player, &location, "door"));
    }

    #[test]
    fn dependency_is_location_scoped_not_inventory_scoped() {
        // the gating object sits in the player's pocket, not the room: the
        // gate stays closed because dependencies only look at the location
        let mut player = Player::new(HashMap::new(), "room");
        let mut lever = named("lever");
        lever.is_used = true;
        player.add_item("lever", lever);

        let mut door = named("door");
        door.depends_on = "lever".into();
        let location = location_with(vec![("door", door)]);

        assert!(!dependency_resolved(&player, &location, "door"));
    }

    #[test]
    fn direction_dependency_uses_exit_gate() {
        let player = Player::new(HashMap::new(), "room");
        let mut location = location_with(vec![("door", named("door"))]);
        location.directions.insert(
            "north".into(),
            crate::engine::types::Exit {
                location: "vault".into(),
                depends_on: "door".into(),
                text_on_error: "The door is shut.".into(),
            },
        );

        assert!(!dependency_resolved(&player, &location, "north"));
        location.objects.get_mut("door").unwrap().is_used = true;
        assert!(dependency_resolved(&player, &location, "north"));
    }
}
