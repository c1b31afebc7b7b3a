//! Game data model.
//!
//! These types mirror the authored game-definition format: a JSON document
//! with a location graph, a starting inventory, and a victory block. Static
//! fields are authored once; the only fields mutated during play are the
//! runtime flags (`visited`, `is_used`, `picked_up`, `has_prompted`,
//! `is_chosen`).

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::engine::errors::EngineError;

/// Descriptor for a hook into the extension host. `function_call` names a
/// registered extension function; an empty name means "no trigger".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerSpec {
    #[serde(default)]
    pub function_call: String,
    #[serde(default)]
    pub function_parameters: serde_json::Value,
}

/// Target of a "use X on Y" pairing. Authored as JSON `false` (no target)
/// or the target object's id as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UseTarget {
    #[default]
    None,
    Object(String),
}

impl UseTarget {
    pub fn as_id(&self) -> Option<&str> {
        match self {
            UseTarget::None => None,
            UseTarget::Object(id) => Some(id.as_str()),
        }
    }
}

impl Serialize for UseTarget {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UseTarget::None => serializer.serialize_bool(false),
            UseTarget::Object(id) => serializer.serialize_str(id),
        }
    }
}

impl<'de> Deserialize<'de> for UseTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Id(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Flag(false) => Ok(UseTarget::None),
            Raw::Flag(true) => Err(de::Error::custom(
                "can_use_on_object must be false or a target object id, not true",
            )),
            Raw::Id(id) if id.is_empty() => Ok(UseTarget::None),
            Raw::Id(id) => Ok(UseTarget::Object(id)),
        }
    }
}

/// An interactive entity owned by a location or by the player's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameObject {
    /// Display name; defaults to the object's map key during normalization.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub can_use: bool,
    #[serde(default)]
    pub can_pickup: bool,
    #[serde(default)]
    pub can_use_on_object: UseTarget,
    #[serde(default)]
    pub text_on_use: String,
    #[serde(default)]
    pub text_on_pickup: String,
    #[serde(default)]
    pub text_on_use_object_on: String,
    /// Shown when this entity's dependency is unmet.
    #[serde(default)]
    pub text_on_error: String,
    #[serde(default)]
    pub remove_after_use: bool,
    /// Single-hop prerequisite: id of an object whose `is_used` flag gates
    /// this one. Empty means no dependency.
    #[serde(default)]
    pub depends_on: String,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub picked_up: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_trigger: Option<TriggerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup_trigger: Option<TriggerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examine_trigger: Option<TriggerSpec>,
}

/// A labeled edge out of a location, optionally gated on an object's
/// `is_used` flag. Authored either as a bare target-location id string or
/// as the full record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Exit {
    pub location: String,
    #[serde(default)]
    pub depends_on: String,
    #[serde(default)]
    pub text_on_error: String,
}

impl<'de> Deserialize<'de> for Exit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Target(String),
            Full {
                location: String,
                #[serde(default)]
                depends_on: String,
                #[serde(default)]
                text_on_error: String,
            },
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Target(location) => Exit {
                location,
                depends_on: String::new(),
                text_on_error: String::new(),
            },
            Raw::Full {
                location,
                depends_on,
                text_on_error,
            } => Exit {
                location,
                depends_on,
                text_on_error,
            },
        })
    }
}

/// A selectable reply to a prompt. Responses keep declaration order, so
/// they are authored as an array with explicit ids rather than a map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Response {
    pub id: String,
    /// Accepted input phrases, matched by exact equality against the
    /// lower-cased player input.
    #[serde(default)]
    pub valid_commands: Vec<String>,
    #[serde(default)]
    pub response_text: String,
    /// When set, choosing this response relocates the player.
    #[serde(default)]
    pub goto_location: String,
    /// When set, choosing this response grants the named object from the
    /// current location to the player.
    #[serde(default)]
    pub receive_object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_trigger: Option<TriggerSpec>,
    #[serde(default)]
    pub is_chosen: bool,
    /// Nested follow-up prompts scoped under this response.
    #[serde(default)]
    pub prompts: Vec<Prompt>,
}

/// A dialogue question surfaced to the player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Prompt {
    pub id: String,
    #[serde(default)]
    pub prompt_text: String,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default)]
    pub has_prompted: bool,
    #[serde(default)]
    pub can_repeat: bool,
    /// Dotted condition paths (`location.prompt.response...`) that must all
    /// resolve to chosen responses before this prompt is shown.
    #[serde(default)]
    pub prompt_conditions: Vec<String>,
}

impl Prompt {
    pub fn response(&self, id: &str) -> Option<&Response> {
        self.responses.iter().find(|r| r.id == id)
    }

    pub fn response_mut(&mut self, id: &str) -> Option<&mut Response> {
        self.responses.iter_mut().find(|r| r.id == id)
    }
}

/// A node in the traversal graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Location {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub text_on_visit: String,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub directions: HashMap<String, Exit>,
    #[serde(default)]
    pub objects: HashMap<String, GameObject>,
    #[serde(default)]
    pub prompts: Vec<Prompt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_trigger: Option<TriggerSpec>,
}

impl Location {
    pub fn prompt(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn prompt_mut(&mut self, id: &str) -> Option<&mut Prompt> {
        self.prompts.iter_mut().find(|p| p.id == id)
    }
}

/// The five victory clauses. All listed requirements must hold at once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VictoryClauses {
    /// Required location id; empty means "any location".
    #[serde(default)]
    pub in_location: String,
    /// Object ids that must all be in inventory (id-or-name match).
    #[serde(default)]
    pub have_objects: Vec<String>,
    /// Object ids that must all appear in the used-objects set (id-exact).
    #[serde(default)]
    pub used_objects: Vec<String>,
    /// Location ids that must all carry `visited == true`.
    #[serde(default)]
    pub visited_locations: Vec<String>,
    /// Dotted paths that must all resolve to chosen responses.
    #[serde(default)]
    pub has_responded: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct VictoryConditions {
    #[serde(default)]
    pub conditions: VictoryClauses,
    #[serde(default)]
    pub victory_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub victory_trigger: Option<TriggerSpec>,
}

/// A complete authored game: location graph, starting inventory, victory
/// block, and the id of the location where play begins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameDefinition {
    pub start_location: String,
    #[serde(default)]
    pub locations: HashMap<String, Location>,
    #[serde(default)]
    pub starting_inventory: HashMap<String, GameObject>,
    #[serde(default)]
    pub victory: VictoryConditions,
}

impl GameDefinition {
    /// Parse a game definition from JSON and normalize it.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let mut def: GameDefinition = serde_json::from_str(raw)?;
        def.normalize();
        if !def.locations.contains_key(&def.start_location) {
            return Err(EngineError::UnknownLocation(def.start_location));
        }
        Ok(def)
    }

    /// Fill in display names that default to the owning map key.
    pub fn normalize(&mut self) {
        for location in self.locations.values_mut() {
            for (id, object) in location.objects.iter_mut() {
                if object.name.is_empty() {
                    object.name = id.clone();
                }
            }
        }
        for (id, object) in self.starting_inventory.iter_mut() {
            if object.name.is_empty() {
                object.name = id.clone();
            }
        }
    }
}
