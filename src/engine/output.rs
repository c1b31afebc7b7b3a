//! Turn transcript lines and the inline span markup rewrite.
//!
//! The engine never writes to a terminal directly: each turn produces a
//! sequence of [`OutputLine`]s tagged with a semantic class, and the host
//! decides how to style them. Line text may carry the lightweight
//! `[visible text](class-name)` markup, which [`render_markup`] rewrites
//! into styled spans.

use serde::{Deserialize, Serialize};

/// Semantic class attached to a printed line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    Plain,
    Error,
    Help,
    Inventory,
    Victory,
    Prompt,
    Info,
    Title,
    Description,
}

/// One printed line of game output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputLine {
    pub class: LineClass,
    pub text: String,
}

impl OutputLine {
    pub fn new(class: LineClass, text: impl Into<String>) -> Self {
        Self {
            class,
            text: text.into(),
        }
    }

    /// The line text with span markup rewritten.
    pub fn rendered(&self) -> String {
        render_markup(&self.text)
    }
}

/// Rewrite `[visible text](class-name)` spans into
/// `<span class="class-name">visible text</span>`.
///
/// The scan is left-to-right: find a `[`, capture up to the next `]`, then
/// capture the class name up to the next `)`. A span with any piece missing
/// degrades to literal passthrough of the remaining text. Input without a
/// `[` is returned unchanged.
pub fn render_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(open) = rest.find('[') else {
            out.push_str(rest);
            return out;
        };
        let candidate = &rest[open..];
        let Some(parsed) = parse_span(candidate) else {
            // unmatched markup: emit everything from the bracket on, literally
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..open]);
        out.push_str(&format!(
            "<span class=\"{}\">{}</span>",
            parsed.class, parsed.text
        ));
        rest = &candidate[parsed.consumed..];
    }
}

struct Span<'a> {
    text: &'a str,
    class: &'a str,
    consumed: usize,
}

/// Parse one `[text](class)` span anchored at the start of `s` (which begins
/// with `[`). Returns `None` when the span is malformed.
fn parse_span(s: &str) -> Option<Span<'_>> {
    let close = s.find(']')?;
    let text = &s[1..close];
    let after = &s[close + 1..];
    if !after.starts_with('(') {
        return None;
    }
    let paren = after.find(')')?;
    let class = &after[1..paren];
    Some(Span {
        text,
        class,
        consumed: close + 1 + paren + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_single_span() {
        let rendered = render_markup("You see a [torch](highlight) on the wall");
        assert_eq!(
            rendered,
            "You see a <span class=\"highlight\">torch</span> on the wall"
        );
        assert_eq!(rendered.matches("<span").count(), 1);
    }

    #[test]
    fn rewrites_multiple_spans() {
        let rendered = render_markup("[a](x) and [b](y)");
        assert_eq!(
            rendered,
            "<span class=\"x\">a</span> and <span class=\"y\">b</span>"
        );
    }

    #[test]
    fn passthrough_without_brackets_is_byte_identical() {
        let input = "Nothing fancy here.";
        assert_eq!(render_markup(input), input);
    }

    #[test]
    fn unmatched_brackets_degrade_to_literal_text() {
        assert_eq!(render_markup("dangling [bracket"), "dangling [bracket");
        assert_eq!(render_markup("no class [text] here"), "no class [text] here");
        assert_eq!(render_markup("half [text](class"), "half [text](class");
    }

    #[test]
    fn text_after_last_span_is_preserved() {
        let rendered = render_markup("go [north](dir), then stop");
        assert_eq!(rendered, "go <span class=\"dir\">north</span>, then stop");
    }
}
