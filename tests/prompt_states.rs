//! The dialogue state machine: entering prompts, response matching,
//! nesting, navigation responses, and repeatability rules.

mod common;

use common::{lines_of, started_session, transcript};
use fabula::engine::LineClass;

#[test]
fn entering_a_location_surfaces_its_prompt() {
    let (mut session, mut ext) = started_session();
    let lines = session.submit("go west", &mut ext);

    assert!(session.in_prompt_mode());
    let prompts = lines_of(&lines, LineClass::Prompt);
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("who goes there?"));
}

#[test]
fn verbs_are_not_parsed_while_prompting() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);

    // "go east" is a perfectly good verb, but in dialogue it is just a
    // wrong answer
    let lines = session.submit("go east", &mut ext);
    assert_eq!(
        lines_of(&lines, LineClass::Error),
        vec!["This wasn't a valid response.".to_string()]
    );
    assert!(session.in_prompt_mode());
    assert_eq!(session.player().location(), "bedroom");
}

#[test]
fn invalid_response_changes_no_flags() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);
    session.submit("banana", &mut ext);

    let mirror = session.locations()["bedroom"].prompt("mirror").unwrap();
    assert!(!mirror.has_prompted);
    assert!(!mirror.response("honest").unwrap().is_chosen);
    assert!(session.in_prompt_mode());
}

#[test]
fn matched_response_sets_flags_and_opens_the_child_prompt() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);

    let lines = session.submit("a friend", &mut ext);
    assert!(transcript(&lines).contains("The mirror shimmers approvingly."));
    assert!(transcript(&lines).contains("day or night?"));
    assert!(session.in_prompt_mode());

    let mirror = session.locations()["bedroom"].prompt("mirror").unwrap();
    assert!(mirror.has_prompted);
    assert!(mirror.response("honest").unwrap().is_chosen);
}

#[test]
fn exhausted_dialogue_returns_to_normal_mode() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);
    session.submit("a friend", &mut ext);

    let lines = session.submit("day", &mut ext);
    assert!(transcript(&lines).contains("Light it is."));
    // the riddle's reward is handed over with its pickup text
    assert!(transcript(&lines).contains("The mirror hands you a charm."));
    assert!(session.player().in_inventory("charm"));
    assert!(!session.in_prompt_mode());

    // the granted object moved out of the room
    assert!(!session.locations()["bedroom"].objects.contains_key("charm"));
}

#[test]
fn goto_response_clears_dialogue_and_moves_the_player() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);
    session.submit("a friend", &mut ext);

    let lines = session.submit("night", &mut ext);
    assert!(transcript(&lines).contains("Dark it is."));
    assert!(transcript(&lines).contains("You are in the hallway."));
    assert_eq!(session.player().location(), "hallway");
    assert!(!session.in_prompt_mode());
}

#[test]
fn answered_prompt_never_reenters_without_can_repeat() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);
    session.submit("a friend", &mut ext);
    session.submit("day", &mut ext);

    // revisit: the mirror has spoken and stays silent
    session.submit("go east", &mut ext);
    let lines = session.submit("go west", &mut ext);
    assert!(lines_of(&lines, LineClass::Prompt).is_empty());
    assert!(!session.in_prompt_mode());
}

#[test]
fn leaving_a_location_resets_open_dialogue() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);
    session.submit("a friend", &mut ext);
    assert!(session.in_prompt_mode());

    // the riddle is open, but walking out of the room abandons it; the
    // next non-verb line must be an ordinary unrecognized command
    session.submit("night", &mut ext); // goto response relocates to hallway
    assert!(!session.in_prompt_mode());
    let lines = session.submit("day", &mut ext);
    assert!(lines_of(&lines, LineClass::Error)
        .iter()
        .any(|l| l.contains("wasn't understood")));
}

#[test]
fn first_response_in_declaration_order_wins() {
    let (mut session, mut ext) = started_session();
    session.submit("go west", &mut ext);

    // "friend" appears in the first response's phrase list only; answering
    // with a phrase from the second response picks the second
    let lines = session.submit("nobody", &mut ext);
    assert!(transcript(&lines).contains("The mirror clouds over."));
    let mirror = session.locations()["bedroom"].prompt("mirror").unwrap();
    assert!(mirror.response("silent").unwrap().is_chosen);
    assert!(!mirror.response("honest").unwrap().is_chosen);
}
