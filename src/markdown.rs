//! Minimal inline markdown for message rendering.
//!
//! Supports exactly three substitutions: `**bold**`, `*italic*`, and
//! newline → `<br>`. They are applied independently and unconditionally:
//! pre-existing markup is not escaped and nested emphasis is not
//! disambiguated. Known limitation, kept deliberately.

use regex::Regex;
use std::sync::OnceLock;

fn bold_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("hard-coded pattern"))
}

fn italic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("hard-coded pattern"))
}

/// Render a message body to inline HTML.
///
/// Bold runs first so that `**` pairs are not consumed as two empty
/// italic spans.
#[must_use]
pub fn render_inline(text: &str) -> String {
    let rendered = bold_pattern().replace_all(text, "<strong>$1</strong>");
    let rendered = italic_pattern().replace_all(&rendered, "<em>$1</em>");
    rendered.replace('\n', "<br>")
}
