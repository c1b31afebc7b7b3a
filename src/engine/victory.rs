//! Victory-condition evaluation.
//!
//! The victory block is a strict conjunction over five clause kinds; the
//! first failing clause short-circuits. Evaluation is pure; the session
//! drives printing, terminality, and the victory trigger.

use log::{debug, warn};
use std::collections::{HashMap, HashSet};

use crate::engine::player::Player;
use crate::engine::prompt::condition_met;
use crate::engine::types::{Location, VictoryConditions};

/// Check every victory clause against the current world state.
pub fn conditions_met(
    victory: &VictoryConditions,
    locations: &HashMap<String, Location>,
    player: &Player,
    used_objects: &HashSet<String>,
) -> bool {
    let c = &victory.conditions;

    if !c.in_location.is_empty() && c.in_location != player.location() {
        debug!("victory unmet: not in location '{}'", c.in_location);
        return false;
    }

    for id in &c.have_objects {
        if !player.in_inventory(id) {
            debug!("victory unmet: '{}' not in inventory", id);
            return false;
        }
    }

    for id in &c.used_objects {
        // id-exact membership, no name fallback
        if !used_objects.contains(id) {
            debug!("victory unmet: '{}' not used", id);
            return false;
        }
    }

    for id in &c.visited_locations {
        match locations.get(id) {
            Some(location) if location.visited => {}
            Some(_) => {
                debug!("victory unmet: '{}' not visited", id);
                return false;
            }
            None => {
                warn!("victory clause names unknown location '{}'", id);
                return false;
            }
        }
    }

    for path in &c.has_responded {
        if !condition_met(locations, path) {
            debug!("victory unmet: response '{}' not chosen", path);
            return false;
        }
    }

    true
}
