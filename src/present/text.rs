//! Text shaping for display: truncation, markup escaping, and
//! neutralizing terminal control characters.
//!
//! Everything the server echoes back (history input, verdicts, reasons,
//! provider lines) goes through [`display_text`] or [`history_input`]
//! before it reaches a screen.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Maximum characters of history input shown per row.
pub const HISTORY_INPUT_MAX_CHARS: usize = 90;

/// Appended when text was cut.
pub const ELLIPSIS: char = '…';

/// Cut `text` to `max_chars` characters, appending [`ELLIPSIS`] only when
/// something was removed. Counts `char`s, never splits a code point.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut out = text[..byte_idx].to_string();
            out.push(ELLIPSIS);
            out
        }
        None => text.to_string(),
    }
}

/// Escape characters that are significant in HTML/XML markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// C0 controls, DEL, and C1 controls. ESC and CSI start terminal escape
/// sequences; BEL terminates OSC.
static CONTROL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F-\x{9F}]").expect("control regex must compile"));

/// Make control characters inert. Tab, CR and LF become a space; every
/// other control is shown as its `\u{..}` escape (ESC reads `\u{1b}`).
pub fn escape_controls(text: &str) -> String {
    CONTROL_RE
        .replace_all(text, |caps: &Captures| {
            let c = caps[0].chars().next().unwrap_or(' ');
            match c {
                '\t' | '\n' | '\r' => " ".to_string(),
                other => other.escape_unicode().to_string(),
            }
        })
        .into_owned()
}

/// Server-supplied text as displayed: markup escaped, controls inert.
pub fn display_text(text: &str) -> String {
    escape_controls(&escape_markup(text))
}

/// History input as displayed: truncated first, then escaped, so an
/// entity is never cut in half.
pub fn history_input(text: &str) -> String {
    display_text(&truncate(text, HISTORY_INPUT_MAX_CHARS))
}
