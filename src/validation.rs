//! Static validation of authored game data.
//!
//! The engine recovers from bad references at play time by logging and
//! degrading, but authors want to hear about them up front. `validate_game`
//! sweeps a definition for the reference mistakes the runtime would
//! otherwise paper over: dangling exits, dependencies on absent objects,
//! use-pairings with no target, dialogue grants that cannot be fulfilled,
//! condition paths that do not resolve, and malformed dialogue declarations.
//! Issues are warnings, never fatal.

use std::collections::HashSet;
use std::fmt;

use crate::engine::prompt::PromptPath;
use crate::engine::types::{GameDefinition, Location, Prompt, Response, UseTarget};

/// One problem found in the game data, anchored to a dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Sweep a game definition for reference mistakes.
pub fn validate_game(def: &GameDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !def.locations.contains_key(&def.start_location) {
        issues.push(ValidationIssue::new(
            "start_location",
            format!("'{}' is not a location", def.start_location),
        ));
    }

    // every object id anywhere, for use-pairing checks
    let all_object_ids: HashSet<&str> = def
        .locations
        .values()
        .flat_map(|l| l.objects.keys())
        .chain(def.starting_inventory.keys())
        .map(String::as_str)
        .collect();

    for (location_id, location) in &def.locations {
        check_location(def, location_id, location, &all_object_ids, &mut issues);
    }

    for (object_id, object) in &def.starting_inventory {
        if let UseTarget::Object(target) = &object.can_use_on_object {
            if !all_object_ids.contains(target.as_str()) {
                issues.push(ValidationIssue::new(
                    format!("starting_inventory.{}", object_id),
                    format!("can_use_on_object names unknown object '{}'", target),
                ));
            }
        }
    }

    check_condition_paths(
        def,
        "victory.has_responded",
        &def.victory.conditions.has_responded,
        &mut issues,
    );
    for location_id in &def.victory.conditions.visited_locations {
        if !def.locations.contains_key(location_id) {
            issues.push(ValidationIssue::new(
                "victory.visited_locations",
                format!("'{}' is not a location", location_id),
            ));
        }
    }
    if !def.victory.conditions.in_location.is_empty()
        && !def
            .locations
            .contains_key(&def.victory.conditions.in_location)
    {
        issues.push(ValidationIssue::new(
            "victory.in_location",
            format!("'{}' is not a location", def.victory.conditions.in_location),
        ));
    }

    issues
}

fn check_location(
    def: &GameDefinition,
    location_id: &str,
    location: &Location,
    all_object_ids: &HashSet<&str>,
    issues: &mut Vec<ValidationIssue>,
) {
    for (direction, exit) in &location.directions {
        let path = format!("{}.directions.{}", location_id, direction);
        if !def.locations.contains_key(&exit.location) {
            issues.push(ValidationIssue::new(
                path.clone(),
                format!("leads to unknown location '{}'", exit.location),
            ));
        }
        if !exit.depends_on.is_empty() && !location.objects.contains_key(&exit.depends_on) {
            issues.push(ValidationIssue::new(
                path,
                format!(
                    "depends_on '{}' is not an object in this location",
                    exit.depends_on
                ),
            ));
        }
    }

    for (object_id, object) in &location.objects {
        let path = format!("{}.objects.{}", location_id, object_id);
        if !object.depends_on.is_empty() && !location.objects.contains_key(&object.depends_on) {
            issues.push(ValidationIssue::new(
                path.clone(),
                format!(
                    "depends_on '{}' is not an object in this location",
                    object.depends_on
                ),
            ));
        }
        if let UseTarget::Object(target) = &object.can_use_on_object {
            if !all_object_ids.contains(target.as_str()) {
                issues.push(ValidationIssue::new(
                    path,
                    format!("can_use_on_object names unknown object '{}'", target),
                ));
            }
        }
    }

    let mut seen_prompt_ids = HashSet::new();
    for prompt in &location.prompts {
        check_prompt(
            def,
            location,
            &format!("{}.{}", location_id, prompt.id),
            prompt,
            &mut seen_prompt_ids,
            issues,
        );
    }
}

fn check_prompt(
    def: &GameDefinition,
    location: &Location,
    path: &str,
    prompt: &Prompt,
    seen_ids: &mut HashSet<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    if !seen_ids.insert(prompt.id.clone()) {
        issues.push(ValidationIssue::new(path, "duplicate prompt id"));
    }
    check_condition_paths(def, path, &prompt.prompt_conditions, issues);

    let mut seen_response_ids = HashSet::new();
    for response in &prompt.responses {
        let response_path = format!("{}.{}", path, response.id);
        check_response(def, location, &response_path, response, &mut seen_response_ids, issues);
    }
}

fn check_response(
    def: &GameDefinition,
    location: &Location,
    path: &str,
    response: &Response,
    seen_ids: &mut HashSet<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    if !seen_ids.insert(response.id.clone()) {
        issues.push(ValidationIssue::new(path, "duplicate response id"));
    }
    if response.valid_commands.is_empty() {
        issues.push(ValidationIssue::new(
            path,
            "response accepts no input phrases",
        ));
    }
    if !response.goto_location.is_empty() && !def.locations.contains_key(&response.goto_location) {
        issues.push(ValidationIssue::new(
            path,
            format!("goto_location '{}' is not a location", response.goto_location),
        ));
    }
    if !response.receive_object.is_empty()
        && !location.objects.contains_key(&response.receive_object)
    {
        issues.push(ValidationIssue::new(
            path,
            format!(
                "receive_object '{}' is not an object in this location",
                response.receive_object
            ),
        ));
    }

    let mut seen_child_ids = HashSet::new();
    for child in &response.prompts {
        check_prompt(
            def,
            location,
            &format!("{}.{}", path, child.id),
            child,
            &mut seen_child_ids,
            issues,
        );
    }
}

/// A condition path must decode and land on a response in the pristine
/// world.
fn check_condition_paths(
    def: &GameDefinition,
    owner: &str,
    paths: &[String],
    issues: &mut Vec<ValidationIssue>,
) {
    for dotted in paths {
        let Some(path) = PromptPath::decode(dotted) else {
            issues.push(ValidationIssue::new(
                owner,
                format!("condition path '{}' does not decode", dotted),
            ));
            continue;
        };
        if crate::engine::prompt::resolve_response(&def.locations, &path).is_none() {
            issues.push(ValidationIssue::new(
                owner,
                format!("condition path '{}' does not resolve to a response", dotted),
            ));
        }
    }
}
