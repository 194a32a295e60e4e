//! Text normalization for extracted page text.
//!
//! The rules run in a fixed order:
//!
//! 1. collapse whitespace runs (including newlines) to one space
//! 2. collapse runs of `.`, `!` and `?` to a single mark
//! 3. delete characters outside the allowed set (word characters,
//!    whitespace, and `. , ! ? ; : ( ) - — – " “ ” « » '`)
//! 4. collapse punctuation runs again, since deletion can join two marks
//! 5. collapse whitespace again and trim
//!
//! Deletion never substitutes a space, so removed symbols do not leave
//! spacing artifacts. The result is idempotent under [`normalize_text`].

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static REPEATED_DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").unwrap());
static REPEATED_BANGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{2,}").unwrap());
static REPEATED_QUESTIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?{2,}").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[^\w\s.,!?;:()\-—–"“”«»']+"#).unwrap());

/// Normalize text into a single clean line.
///
/// # Example
///
/// ```rust
/// use synopsis_core::normalize_text;
///
/// let text = normalize_text("  Hello,\n\n   world!!! @@@ Really...  ");
/// assert_eq!(text, "Hello, world! Really.");
/// ```
pub fn normalize_text(text: &str) -> String {
    let text = collapse_whitespace(text);
    let text = collapse_punctuation(&text);
    let text = DISALLOWED.replace_all(&text, "");
    let text = collapse_punctuation(&text);
    collapse_whitespace(&text).trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

fn collapse_punctuation(text: &str) -> String {
    let text = REPEATED_DOTS.replace_all(text, ".");
    let text = REPEATED_BANGS.replace_all(&text, "!");
    REPEATED_QUESTIONS.replace_all(&text, "?").into_owned()
}
