//! Log hygiene for player-typed input: keep every logged command on one
//! bounded line, with control characters made visible.

/// Flatten a string for single-line logging. Control characters are
/// rendered with their escape sequences and long input is cut off with an
/// ellipsis so a hostile paste cannot flood the log.
pub fn escape_log(s: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut out = String::with_capacity(s.len().min(MAX_CHARS));
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_CHARS {
            out.push('…');
            break;
        }
        if ch.is_control() {
            out.extend(ch.escape_default());
        } else {
            out.push(ch);
        }
    }
    out
}
