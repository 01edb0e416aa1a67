//! Command-line segmentation
//!
//! Splits a compound command line on `|`, `||`, `&&` and `;` and extracts the
//! base command name of each segment. This is a permission gate, not a shell
//! grammar: quoting, subshells and redirections are not understood. A control
//! operator inside quotes still splits the line, which can only make a check
//! stricter.

use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:\|{1,2}|&&|;)\s*").expect("separator regex is valid"));

/// Extract the base command name from each segment of a compound command
///
/// Leading `NAME=value` environment assignments are skipped. Empty segments
/// contribute nothing, so blank input yields an empty list.
pub fn parse_command_segments(command_line: &str) -> Vec<String> {
    SEPARATOR
        .split(command_line)
        .filter_map(segment_command)
        .map(str::to_string)
        .collect()
}

fn segment_command(segment: &str) -> Option<&str> {
    let mut words = segment.split_whitespace().peekable();
    let first = *words.peek()?;

    // A segment made only of assignments yields its first word, which no
    // rule will match.
    Some(words.find(|w| !is_env_assignment(w)).unwrap_or(first))
}

fn is_env_assignment(word: &str) -> bool {
    word.contains('=') && !word.starts_with('-')
}
