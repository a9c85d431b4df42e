//! Terminal sanitization for untrusted response text.

use std::sync::LazyLock;

use regex::Regex;

// CSI sequences (`ESC [ ... final`) plus bare two-byte escapes.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;:?]*[ -/]*[@-~]|\x1b[@-_]").expect("escape pattern is valid")
});

/// Strip ANSI escape sequences and control characters from text that came
/// out of a response payload. Everything a reporter prints goes through
/// this before it reaches the terminal.
pub fn sanitize_for_terminal(text: &str) -> String {
    let stripped = ANSI_ESCAPE.replace_all(text, "");
    stripped.chars().filter(|c| !c.is_control()).collect()
}
