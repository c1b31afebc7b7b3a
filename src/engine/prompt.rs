//! Typed addressing for dialogue trees.
//!
//! Prompts nest under responses, which nest under prompts, rooted at a
//! location. A node is addressed by a [`PromptPath`]: a location id plus an
//! alternating list of prompt/response segments. The dotted strings in game
//! data (`"cellar.greeting.yes.followup"`) decode into these paths; walkers
//! then navigate the real tree instead of evaluating strings. Because paths
//! are plain data, the active prompt stack survives serialization.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::engine::types::{Location, Prompt, Response};

/// One step into a dialogue tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PathSeg {
    Prompt(String),
    Response(String),
}

/// Address of a dialogue node: location id plus alternating segments,
/// starting with a prompt id. An empty segment list addresses the
/// location's root prompt set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptPath {
    pub location: String,
    pub segments: Vec<PathSeg>,
}

impl PromptPath {
    /// The root prompt container of a location.
    pub fn root(location: &str) -> Self {
        Self {
            location: location.to_string(),
            segments: Vec::new(),
        }
    }

    /// Extend the path with a further segment.
    pub fn child(&self, seg: PathSeg) -> Self {
        let mut segments = self.segments.clone();
        segments.push(seg);
        Self {
            location: self.location.clone(),
            segments,
        }
    }

    /// Decode a dotted condition path. The first segment is the location
    /// id; the rest alternate prompt, response, prompt, response...
    pub fn decode(dotted: &str) -> Option<Self> {
        let mut parts = dotted.split('.');
        let location = parts.next()?.to_string();
        if location.is_empty() {
            return None;
        }
        let mut segments = Vec::new();
        for (i, part) in parts.enumerate() {
            if part.is_empty() {
                return None;
            }
            let seg = if i % 2 == 0 {
                PathSeg::Prompt(part.to_string())
            } else {
                PathSeg::Response(part.to_string())
            };
            segments.push(seg);
        }
        Some(Self { location, segments })
    }
}

impl fmt::Display for PromptPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.location)?;
        for seg in &self.segments {
            match seg {
                PathSeg::Prompt(id) | PathSeg::Response(id) => write!(f, ".{}", id)?,
            }
        }
        Ok(())
    }
}

/// One frame of the active dialogue stack: the container whose prompt set
/// is open, plus the id of the prompt currently shown from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptFrame {
    pub container: PromptPath,
    pub prompt_id: String,
}

impl PromptFrame {
    /// The full path of the shown prompt itself.
    pub fn prompt_path(&self) -> PromptPath {
        self.container.child(PathSeg::Prompt(self.prompt_id.clone()))
    }
}

/// Walk to the prompt set a container path addresses: the location's root
/// set for an empty path, or the child set under the response the path ends
/// in. Returns `None` when the path does not land on a prompt container.
pub fn prompts_at<'a>(
    locations: &'a HashMap<String, Location>,
    container: &PromptPath,
) -> Option<&'a [Prompt]> {
    let location = locations.get(&container.location)?;
    if container.segments.is_empty() {
        return Some(&location.prompts);
    }
    match walk(location, &container.segments)? {
        Node::Response(response) => Some(&response.prompts),
        Node::Prompt(_) => None,
    }
}

/// Walk to the prompt a path addresses (last segment must be a prompt).
pub fn resolve_prompt<'a>(
    locations: &'a HashMap<String, Location>,
    path: &PromptPath,
) -> Option<&'a Prompt> {
    let location = locations.get(&path.location)?;
    match walk(location, &path.segments)? {
        Node::Prompt(prompt) => Some(prompt),
        Node::Response(_) => None,
    }
}

/// Walk to the response a path addresses (last segment must be a response).
pub fn resolve_response<'a>(
    locations: &'a HashMap<String, Location>,
    path: &PromptPath,
) -> Option<&'a Response> {
    let location = locations.get(&path.location)?;
    match walk(location, &path.segments)? {
        Node::Response(response) => Some(response),
        Node::Prompt(_) => None,
    }
}

/// Mutable walk to a prompt.
pub fn resolve_prompt_mut<'a>(
    locations: &'a mut HashMap<String, Location>,
    path: &PromptPath,
) -> Option<&'a mut Prompt> {
    let location = locations.get_mut(&path.location)?;
    match walk_mut(location, &path.segments)? {
        NodeMut::Prompt(prompt) => Some(prompt),
        NodeMut::Response(_) => None,
    }
}

/// Mutable walk to a response.
pub fn resolve_response_mut<'a>(
    locations: &'a mut HashMap<String, Location>,
    path: &PromptPath,
) -> Option<&'a mut Response> {
    let location = locations.get_mut(&path.location)?;
    match walk_mut(location, &path.segments)? {
        NodeMut::Response(response) => Some(response),
        NodeMut::Prompt(_) => None,
    }
}

/// Evaluate one dotted condition: the path must decode, resolve to a
/// response, and that response must have been chosen. Anything else is a
/// data-integrity miss and counts as unmet.
pub fn condition_met(locations: &HashMap<String, Location>, dotted: &str) -> bool {
    let Some(path) = PromptPath::decode(dotted) else {
        warn!("condition path '{}' does not decode; treating as unmet", dotted);
        return false;
    };
    match resolve_response(locations, &path) {
        Some(response) => response.is_chosen,
        None => {
            warn!(
                "condition path '{}' does not resolve to a response; verify the game data",
                dotted
            );
            false
        }
    }
}

enum Node<'a> {
    Prompt(&'a Prompt),
    Response(&'a Response),
}

enum NodeMut<'a> {
    Prompt(&'a mut Prompt),
    Response(&'a mut Response),
}

fn walk<'a>(location: &'a Location, segments: &[PathSeg]) -> Option<Node<'a>> {
    let mut segments = segments.iter();
    let first = match segments.next()? {
        PathSeg::Prompt(id) => location.prompt(id)?,
        PathSeg::Response(_) => return None,
    };
    let mut node = Node::Prompt(first);
    for seg in segments {
        node = match (node, seg) {
            (Node::Prompt(p), PathSeg::Response(id)) => Node::Response(p.response(id)?),
            (Node::Response(r), PathSeg::Prompt(id)) => {
                Node::Prompt(r.prompts.iter().find(|p| p.id == *id)?)
            }
            _ => return None,
        };
    }
    Some(node)
}

fn walk_mut<'a>(location: &'a mut Location, segments: &[PathSeg]) -> Option<NodeMut<'a>> {
    let mut segments = segments.iter();
    let first = match segments.next()? {
        PathSeg::Prompt(id) => location.prompt_mut(id)?,
        PathSeg::Response(_) => return None,
    };
    let mut node = NodeMut::Prompt(first);
    for seg in segments {
        node = match (node, seg) {
            (NodeMut::Prompt(p), PathSeg::Response(id)) => NodeMut::Response(p.response_mut(id)?),
            (NodeMut::Response(r), PathSeg::Prompt(id)) => {
                NodeMut::Prompt(r.prompts.iter_mut().find(|p| p.id == *id)?)
            }
            _ => return None,
        };
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_world() -> HashMap<String, Location> {
        let grandchild = Prompt {
            id: "p2".into(),
            prompt_text: "And then?".into(),
            ..Default::default()
        };
        let chosen = Response {
            id: "r1".into(),
            is_chosen: true,
            prompts: vec![grandchild],
            ..Default::default()
        };
        let root = Prompt {
            id: "p1".into(),
            prompt_text: "Well?".into(),
            responses: vec![chosen],
            ..Default::default()
        };
        let mut locations = HashMap::new();
        locations.insert(
            "cellar".to_string(),
            Location {
                name: "Cellar".into(),
                prompts: vec![root],
                ..Default::default()
            },
        );
        locations
    }

    #[test]
    fn decode_alternates_prompt_and_response() {
        let path = PromptPath::decode("cellar.p1.r1.p2").unwrap();
        assert_eq!(path.location, "cellar");
        assert_eq!(
            path.segments,
            vec![
                PathSeg::Prompt("p1".into()),
                PathSeg::Response("r1".into()),
                PathSeg::Prompt("p2".into()),
            ]
        );
    }

    #[test]
    fn decode_rejects_empty_pieces() {
        assert!(PromptPath::decode("").is_none());
        assert!(PromptPath::decode("cellar..r1").is_none());
    }

    #[test]
    fn walkers_land_on_the_right_node_kind() {
        let locations = nested_world();
        let response = PromptPath::decode("cellar.p1.r1").unwrap();
        assert!(resolve_response(&locations, &response).is_some());
        assert!(resolve_prompt(&locations, &response).is_none());

        let grandchild = PromptPath::decode("cellar.p1.r1.p2").unwrap();
        assert_eq!(
            resolve_prompt(&locations, &grandchild).unwrap().prompt_text,
            "And then?"
        );
    }

    #[test]
    fn prompts_at_follows_response_containers() {
        let locations = nested_world();
        let root = PromptPath::root("cellar");
        assert_eq!(prompts_at(&locations, &root).unwrap().len(), 1);

        let under_response = PromptPath::decode("cellar.p1.r1").unwrap();
        let children = prompts_at(&locations, &under_response).unwrap();
        assert_eq!(children[0].id, "p2");
    }

    #[test]
    fn condition_requires_chosen_response() {
        let mut locations = nested_world();
        assert!(condition_met(&locations, "cellar.p1.r1"));

        resolve_response_mut(&mut locations, &PromptPath::decode("cellar.p1.r1").unwrap())
            .unwrap()
            .is_chosen = false;
        assert!(!condition_met(&locations, "cellar.p1.r1"));

        // unresolved paths fail instead of crashing
        assert!(!condition_met(&locations, "cellar.p1.zzz"));
        assert!(!condition_met(&locations, "attic.p1.r1"));
    }

    #[test]
    fn display_round_trips_dotted_form() {
        let path = PromptPath::decode("cellar.p1.r1.p2.r2").unwrap();
        assert_eq!(path.to_string(), "cellar.p1.r1.p2.r2");
    }
}
