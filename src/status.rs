//! Status counters
//!
//! Word/line/character counts for the status bar. The word count strips
//! comments and LaTeX commands first so `\usepackage{geometry}` does not
//! count as prose.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static COMMAND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z@]+(?:\[[^\]]*\])?(?:\{[^}]*\})?").expect("command regex"));

/// Counters displayed in the host's status bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounters {
    pub words: usize,
    pub lines: usize,
    pub chars: usize,
}

/// Count words, lines and characters over the document's lines
pub fn count<'a>(lines: impl Iterator<Item = &'a str>) -> StatusCounters {
    let mut words = 0;
    let mut line_count = 0;
    let mut chars = 0;

    for line in lines {
        line_count += 1;
        chars += line.chars().count() + 1; // the trailing newline

        // Drop the comment tail, then erase commands with their arguments
        let visible = match line.find('%') {
            Some(at) => &line[..at],
            None => line,
        };
        let stripped = COMMAND.replace_all(visible, " ");
        words += stripped
            .split(|c: char| c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | '*'))
            .filter(|word| !word.is_empty())
            .count();
    }

    StatusCounters {
        words,
        lines: line_count,
        chars: chars.saturating_sub(1),
    }
}
