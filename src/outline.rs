//! Document outline extraction
//!
//! Scans for sectioning commands at line starts and produces a flat list of
//! entries with nesting levels. The host decides how to present hierarchy;
//! the engine only reports what is where.

use serde::{Deserialize, Serialize};

/// Nesting depth of an outline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutlineLevel {
    Section,
    Subsection,
    Subsubsection,
}

/// One sectioning command found in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: OutlineLevel,
    pub title: String,
    /// 1-based line the command appears on
    pub line: usize,
}

/// Parse an outline from the document's lines.
///
/// Longer command names are tested first so `\subsection` is never misread
/// as `\section`.
pub fn parse_outline<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<OutlineEntry> {
    const MARKERS: [(&str, OutlineLevel); 3] = [
        ("\\subsubsection{", OutlineLevel::Subsubsection),
        ("\\subsection{", OutlineLevel::Subsection),
        ("\\section{", OutlineLevel::Section),
    ];

    let mut entries = Vec::new();
    for (index, raw) in lines.enumerate() {
        let line = raw.trim_start();
        for (marker, level) in MARKERS {
            if let Some(rest) = line.strip_prefix(marker) {
                if let Some(close) = rest.find('}') {
                    let title = rest[..close].trim();
                    if !title.is_empty() {
                        entries.push(OutlineEntry {
                            level,
                            title: title.to_string(),
                            line: index + 1,
                        });
                    }
                }
                break;
            }
        }
    }
    entries
}
