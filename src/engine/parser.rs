//! Free-text command classification.
//!
//! [`parse`] turns a raw player line into an [`Intent`] through a fixed-order
//! pattern table; first match wins. The parser is pure: it never looks at
//! world state, so re-parsing the same input always yields the same intent.
//! Dialogue-mode input bypasses it entirely (the prompt machine matches
//! responses, not verbs).

/// Classified player intent plus its argument phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Help,
    ShowInventory,
    DescribeLocation,
    PickUp(String),
    Examine(String),
    Move(String),
    Use {
        object: String,
        target: Option<String>,
    },
    Unrecognized(String),
}

/// Classify a raw input line.
///
/// The line is lower-cased and trimmed first. Verb prefixes anchor at the
/// start of the line and require a following whitespace boundary, so "uses"
/// never classifies as `use`. Object and direction phrases drop a leading
/// "the ".
pub fn parse(raw: &str) -> Intent {
    let command = raw.to_lowercase();
    let command = command.trim();

    match command {
        "help" => return Intent::Help,
        "inventory" => return Intent::ShowInventory,
        "look around" => return Intent::DescribeLocation,
        _ => {}
    }

    if let Some(rest) = strip_verb(command, &["pick up", "take", "grab"]) {
        return Intent::PickUp(strip_article(rest).to_string());
    }

    if let Some(rest) = strip_verb(command, &["examine", "look at"]) {
        return Intent::Examine(strip_article(rest).to_string());
    }

    if let Some(rest) = strip_verb(command, &["go", "move"]) {
        // "go to the kitchen" and "go kitchen" are equivalent
        let rest = strip_verb(rest, &["to"]).unwrap_or(rest);
        return Intent::Move(strip_article(rest).to_string());
    }

    if let Some(rest) = strip_verb(command, &["use"]) {
        // split at the last standalone " on " for the paired form
        return match rest.rsplit_once(" on ") {
            Some((object, target)) => Intent::Use {
                object: strip_article(object.trim()).to_string(),
                target: Some(strip_article(target.trim()).to_string()),
            },
            None => Intent::Use {
                object: strip_article(rest).to_string(),
                target: None,
            },
        };
    }

    Intent::Unrecognized(command.to_string())
}

/// Strip the first matching verb prefix, requiring a whitespace boundary
/// after it. Returns the trimmed remainder.
fn strip_verb<'a>(command: &'a str, verbs: &[&str]) -> Option<&'a str> {
    for verb in verbs {
        if let Some(rest) = command.strip_prefix(verb) {
            if rest.starts_with(char::is_whitespace) {
                return Some(rest.trim_start());
            }
        }
    }
    None
}

fn strip_article(phrase: &str) -> &str {
    phrase.strip_prefix("the ").unwrap_or(phrase)
}
