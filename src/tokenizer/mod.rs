//! Pattern tokenizer
//!
//! Turns one line of LaTeX into style spans. Two properties matter here:
//!
//! - **Relevance prefilter**: a single cheap scan of the line decides which
//!   categories can possibly match; a category whose trigger characters are
//!   absent never runs its regex. This is the dominant constant-factor win.
//! - **Priority claiming**: categories run most-specific first, and a span
//!   claimed by a higher-priority category suppresses overlapping matches
//!   from everything below it, so the generic command catch-all never
//!   overwrites a section heading or a comment.

mod patterns;

pub use patterns::{SpanCategory, STRUCTURAL_CATEGORIES};

use patterns::{is_relevant, LineProfile, PATTERNS};
use serde::{Deserialize, Serialize};

/// One styled region of a line, byte offsets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSpan {
    pub category: SpanCategory,
    pub start: usize,
    pub end: usize,
}

/// Tokenize a line with the full pattern set
pub fn tokenize(line: &str) -> Vec<StyleSpan> {
    tokenize_subset(line, None)
}

/// Tokenize a line with only the structural categories (huge-document
/// viewport styling)
pub fn tokenize_structural(line: &str) -> Vec<StyleSpan> {
    tokenize_subset(line, Some(STRUCTURAL_CATEGORIES))
}

fn tokenize_subset(line: &str, subset: Option<&[SpanCategory]>) -> Vec<StyleSpan> {
    if line.trim().is_empty() {
        return Vec::new();
    }

    let profile = LineProfile::scan(line);
    let bytes = line.as_bytes();
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut spans = Vec::new();

    for spec in PATTERNS.iter() {
        if let Some(subset) = subset {
            if !subset.contains(&spec.category) {
                continue;
            }
        }
        if !is_relevant(spec.category, line, &profile) {
            continue;
        }

        for found in spec.regex.find_iter(line) {
            let (start, end) = (found.start(), found.end());
            if spec.no_word_before && is_word_byte(bytes, start.checked_sub(1)) {
                continue;
            }
            if spec.no_word_after && is_word_byte(bytes, Some(end)) {
                continue;
            }
            if spec.no_alpha_after
                && bytes.get(end).is_some_and(|b| b.is_ascii_alphabetic())
            {
                continue;
            }
            if claimed.iter().any(|&(s, e)| start < e && s < end) {
                continue;
            }
            claimed.push((start, end));
            spans.push(StyleSpan {
                category: spec.category,
                start,
                end,
            });
        }
    }

    spans.sort_by_key(|span| (span.start, span.end));
    spans
}

fn is_word_byte(bytes: &[u8], index: Option<usize>) -> bool {
    index
        .and_then(|i| bytes.get(i))
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
}
