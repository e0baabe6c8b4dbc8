//! LaTeX pattern table
//!
//! One compiled regex per span category, listed from most specific to most
//! general: comments claim their text first, the generic command catch-all
//! last. The `regex` crate has no look-around, so boundary assertions are
//! expressed as per-match flags checked by the matcher (`no_alpha_after`
//! rejects `\section` inside `\sectioning`, `no_word_before`/`no_word_after`
//! reject digits embedded in identifiers).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Style span categories, declared in priority order (highest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpanCategory {
    Comment,
    DocumentClass,
    Package,
    Section,
    Subsection,
    TitleCommand,
    ListEnv,
    MathEnv,
    FigureEnv,
    Environment,
    TextFormat,
    FontSize,
    MathInline,
    MathSymbol,
    RefCite,
    Label,
    Hyperref,
    ProperName,
    BracedContent,
    Placeholder,
    Number,
    Bracket,
    Command,
}

/// Reduced subset for viewport-only styling of huge documents: only the
/// categories that matter for navigation and readability.
pub const STRUCTURAL_CATEGORIES: &[SpanCategory] = &[
    SpanCategory::Comment,
    SpanCategory::DocumentClass,
    SpanCategory::Section,
    SpanCategory::Subsection,
    SpanCategory::MathEnv,
    SpanCategory::MathInline,
];

pub(crate) struct PatternSpec {
    pub category: SpanCategory,
    pub regex: Regex,
    /// Reject a match directly followed by an ASCII letter
    pub no_alpha_after: bool,
    /// Reject a match directly preceded by a word character
    pub no_word_before: bool,
    /// Reject a match directly followed by a word character
    pub no_word_after: bool,
}

impl PatternSpec {
    fn plain(category: SpanCategory, pattern: &str) -> Self {
        Self {
            category,
            regex: Regex::new(pattern).expect("pattern table regex"),
            no_alpha_after: false,
            no_word_before: false,
            no_word_after: false,
        }
    }

    fn command(category: SpanCategory, pattern: &str) -> Self {
        Self {
            no_alpha_after: true,
            ..Self::plain(category, pattern)
        }
    }

    fn word(category: SpanCategory, pattern: &str) -> Self {
        Self {
            no_word_before: true,
            no_word_after: true,
            ..Self::plain(category, pattern)
        }
    }
}

pub(crate) static PATTERNS: Lazy<Vec<PatternSpec>> = Lazy::new(|| {
    vec![
        PatternSpec::plain(SpanCategory::Comment, r"%.*"),
        PatternSpec::plain(
            SpanCategory::DocumentClass,
            r"\\documentclass(?:\[[^\]]*\])?\{[^}]*\}",
        ),
        PatternSpec::plain(
            SpanCategory::Package,
            r"\\usepackage(?:\[[^\]]*\])?\{[^}]*\}",
        ),
        PatternSpec::command(SpanCategory::Section, r"\\section\*?"),
        PatternSpec::command(SpanCategory::Subsection, r"\\(?:sub)+section\*?"),
        PatternSpec::command(SpanCategory::TitleCommand, r"\\(?:title|author|date)"),
        PatternSpec::plain(
            SpanCategory::ListEnv,
            r"\\(?:begin|end)\{(?:itemize|enumerate|description)\}",
        ),
        PatternSpec::plain(
            SpanCategory::MathEnv,
            r"\\(?:begin|end)\{(?:equation|align|gather|split|math|displaymath|eqnarray)\*?\}",
        ),
        PatternSpec::plain(
            SpanCategory::FigureEnv,
            r"\\(?:begin|end)\{(?:figure|table|tabular|array|longtable|tblr|matrix|pmatrix|bmatrix|vmatrix|Vmatrix|Bmatrix|cases|numcases|substack)\*?\}",
        ),
        PatternSpec::plain(SpanCategory::Environment, r"\\(?:begin|end)\{[^}]+\}"),
        PatternSpec::command(
            SpanCategory::TextFormat,
            r"\\(?:textbf|textit|texttt|textsc|emph|underline|textcolor)",
        ),
        PatternSpec::command(
            SpanCategory::FontSize,
            r"\\(?:tiny|scriptsize|footnotesize|small|normalsize|large|Large|LARGE|huge|Huge)",
        ),
        PatternSpec::plain(SpanCategory::MathInline, r"\$[^$\n]*\$|\\\([^)]*\\\)"),
        PatternSpec::command(
            SpanCategory::MathSymbol,
            r"\\(?:alpha|beta|gamma|delta|epsilon|theta|lambda|mu|pi|sigma|phi|psi|omega|sum|int|prod|sqrt|frac|partial|infty|nabla|times|cdot|ldots|pm|mp|leq|geq|neq|approx|equiv|subset|supset|in|cup|cap|forall|exists)",
        ),
        PatternSpec::command(
            SpanCategory::RefCite,
            r"\\(?:ref|cite|citet|citep|autoref|nameref|pageref|eqref)",
        ),
        PatternSpec::plain(SpanCategory::Label, r"\\label\{[^}]*\}"),
        PatternSpec::command(SpanCategory::Hyperref, r"\\(?:href|url|hyperref)"),
        PatternSpec::word(
            SpanCategory::ProperName,
            r"[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+",
        ),
        PatternSpec::plain(SpanCategory::BracedContent, r"\{[^{}]*\}"),
        PatternSpec::plain(SpanCategory::Placeholder, r"⟨[^⟩]*⟩"),
        PatternSpec::word(SpanCategory::Number, r"\d+(?:\.\d+)?"),
        PatternSpec::plain(SpanCategory::Bracket, r"[{}\[\]()]"),
        PatternSpec::plain(SpanCategory::Command, r"\\[a-zA-Z@]+"),
    ]
});

/// Cheap one-pass line profile consumed by the relevance prefilter
pub(crate) struct LineProfile {
    pub has_backslash: bool,
    pub has_percent: bool,
    pub has_math: bool,
    pub has_digit: bool,
    pub has_upper: bool,
    pub has_bracket_char: bool,
    pub has_placeholder: bool,
}

impl LineProfile {
    pub fn scan(line: &str) -> Self {
        let mut profile = Self {
            has_backslash: false,
            has_percent: false,
            has_math: false,
            has_digit: false,
            has_upper: false,
            has_bracket_char: false,
            has_placeholder: false,
        };
        let mut open_angle = false;
        let mut close_angle = false;
        for ch in line.chars() {
            match ch {
                '\\' => profile.has_backslash = true,
                '%' => profile.has_percent = true,
                '$' => profile.has_math = true,
                '{' | '}' | '[' | ']' | '(' | ')' => profile.has_bracket_char = true,
                '⟨' => open_angle = true,
                '⟩' => close_angle = true,
                _ => {
                    if ch.is_ascii_digit() {
                        profile.has_digit = true;
                    } else if ch.is_ascii_uppercase() {
                        profile.has_upper = true;
                    }
                }
            }
        }
        // \( ... \) inline math without dollar signs
        if profile.has_backslash && line.contains("\\(") {
            profile.has_math = true;
        }
        profile.has_placeholder = open_angle && close_angle;
        profile
    }
}

/// The relevance prefilter: true only if `line` contains the trigger
/// characters/substrings this category's pattern requires. A category that
/// returns false here never runs its regex against the line.
pub(crate) fn is_relevant(category: SpanCategory, line: &str, profile: &LineProfile) -> bool {
    match category {
        SpanCategory::Comment => profile.has_percent,
        SpanCategory::DocumentClass => profile.has_backslash && line.contains("documentclass"),
        SpanCategory::Package => profile.has_backslash && line.contains("usepackage"),
        SpanCategory::Section | SpanCategory::Subsection => {
            profile.has_backslash && line.contains("section")
        }
        SpanCategory::TitleCommand => {
            profile.has_backslash
                && (line.contains("title") || line.contains("author") || line.contains("date"))
        }
        SpanCategory::ListEnv
        | SpanCategory::MathEnv
        | SpanCategory::FigureEnv
        | SpanCategory::Environment => {
            profile.has_backslash && (line.contains("begin") || line.contains("end"))
        }
        SpanCategory::TextFormat => {
            profile.has_backslash
                && ["textbf", "textit", "texttt", "textsc", "emph", "underline", "textcolor"]
                    .iter()
                    .any(|cmd| line.contains(cmd))
        }
        SpanCategory::FontSize => {
            profile.has_backslash
                && [
                    "tiny",
                    "scriptsize",
                    "footnotesize",
                    "small",
                    "normalsize",
                    "large",
                    "Large",
                    "LARGE",
                    "huge",
                    "Huge",
                ]
                .iter()
                .any(|size| line.contains(size))
        }
        SpanCategory::MathInline | SpanCategory::MathSymbol => profile.has_math,
        SpanCategory::RefCite => {
            profile.has_backslash && (line.contains("ref") || line.contains("cite"))
        }
        SpanCategory::Label => profile.has_backslash && line.contains("label"),
        SpanCategory::Hyperref => {
            profile.has_backslash
                && (line.contains("href") || line.contains("url") || line.contains("hyperref"))
        }
        SpanCategory::ProperName => profile.has_upper,
        SpanCategory::BracedContent => line.contains('{') || line.contains('}'),
        SpanCategory::Placeholder => profile.has_placeholder,
        SpanCategory::Number => profile.has_digit,
        SpanCategory::Bracket => profile.has_bracket_char,
        SpanCategory::Command => profile.has_backslash,
    }
}
