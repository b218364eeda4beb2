//! Removal of ANSI/VT escape sequences.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// ESC, one Fe byte, parameter bytes, intermediate bytes, final byte.
static ESCAPE_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b[@-_][0-?]*[ -/]*[@-~]").expect("valid regex"));

/// Strip every escape sequence from `text`.
///
/// Removing one sequence can splice a new one together out of its
/// neighbours (`"\x1b\x1b[1m[0m"`), so stripping repeats until nothing
/// matches. That makes `strip(&strip(x)) == strip(x)` for any input.
#[must_use]
pub fn strip(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let stripped = match ESCAPE_SEQUENCE.replace_all(&current, "") {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => Some(next),
        };
        match stripped {
            Some(next) => current = next,
            None => return current,
        }
    }
}
