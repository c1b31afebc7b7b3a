//! Test utilities & fixtures.
//! A compact four-location world exercising gated directions, object
//! pairings, nested dialogue, and every victory clause.

use fabula::engine::{Extensions, GameDefinition, LineClass, OutputLine, Session};

/// A small world: a hallway with a bolted door, an office with a strongbox
/// puzzle, and a bedroom with a talking mirror.
pub const TEST_WORLD: &str = r#"{
    "start_location": "hallway",
    "locations": {
        "hallway": {
            "name": "Hallway",
            "description": "A narrow hallway.",
            "text_on_visit": "You are in the hallway.",
            "directions": {
                "north": {
                    "location": "office",
                    "depends_on": "hallway_door",
                    "text_on_error": "The door is bolted shut."
                },
                "west": "bedroom"
            },
            "objects": {
                "hallway_door": {
                    "name": "door",
                    "description": "A sturdy door with a bolt.",
                    "can_use": true,
                    "text_on_use": "You slide the bolt back.",
                    "can_use_on_object": false
                }
            }
        },
        "office": {
            "name": "Office",
            "description": "A cramped office.",
            "text_on_visit": "You enter the office.",
            "directions": { "south": "hallway" },
            "objects": {
                "key": {
                    "name": "brass key",
                    "description": "A small brass key.",
                    "can_pickup": true,
                    "can_use_on_object": "strongbox",
                    "text_on_use_object_on": "The strongbox springs open.",
                    "remove_after_use": true
                },
                "strongbox": {
                    "name": "strongbox",
                    "description": "An iron strongbox."
                },
                "medal": {
                    "name": "medal",
                    "description": "A war medal.",
                    "can_pickup": true,
                    "depends_on": "strongbox",
                    "text_on_error": "It is locked inside the strongbox."
                }
            }
        },
        "bedroom": {
            "name": "Bedroom",
            "description": "A small bedroom.",
            "text_on_visit": "You step into the bedroom.",
            "directions": { "east": "hallway" },
            "prompts": [
                {
                    "id": "mirror",
                    "prompt_text": "A voice from the mirror asks: who goes there?",
                    "responses": [
                        {
                            "id": "honest",
                            "valid_commands": ["a friend", "friend"],
                            "response_text": "The mirror shimmers approvingly.",
                            "prompts": [
                                {
                                    "id": "riddle",
                                    "prompt_text": "Then answer: day or night?",
                                    "responses": [
                                        {
                                            "id": "day",
                                            "valid_commands": ["day"],
                                            "response_text": "Light it is.",
                                            "receive_object": "charm"
                                        },
                                        {
                                            "id": "night",
                                            "valid_commands": ["night"],
                                            "response_text": "Dark it is.",
                                            "goto_location": "hallway"
                                        }
                                    ]
                                }
                            ]
                        },
                        {
                            "id": "silent",
                            "valid_commands": ["nobody"],
                            "response_text": "The mirror clouds over."
                        }
                    ]
                }
            ],
            "objects": {
                "charm": {
                    "name": "charm",
                    "description": "A silver charm.",
                    "text_on_pickup": "The mirror hands you a charm."
                }
            }
        }
    },
    "victory": {
        "conditions": {
            "in_location": "office",
            "have_objects": ["medal"],
            "used_objects": ["key"],
            "visited_locations": ["bedroom"],
            "has_responded": ["bedroom.mirror.honest.riddle.day"]
        },
        "victory_text": "You have won the game."
    }
}"#;

pub fn test_definition() -> GameDefinition {
    GameDefinition::from_json(TEST_WORLD).expect("test world parses")
}

/// Build and start a session over the test world, discarding start output.
#[allow(dead_code)] // not every test binary uses every helper
pub fn started_session() -> (Session, Extensions) {
    let mut session = Session::new(test_definition(), None).expect("session builds");
    let mut ext = Extensions::new();
    session.start(&mut ext);
    (session, ext)
}

/// All line texts joined for easy substring assertions.
#[allow(dead_code)]
pub fn transcript(lines: &[OutputLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Texts of the lines carrying a given class.
#[allow(dead_code)]
pub fn lines_of(lines: &[OutputLine], class: LineClass) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.class == class)
        .map(|l| l.text.clone())
        .collect()
}
