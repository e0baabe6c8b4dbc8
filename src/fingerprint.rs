//! Content fingerprints
//!
//! Two flavors of change detection key:
//! - [`LineFingerprint`]: a 64-bit hash of one line, cheap enough to compute
//!   on every keystroke for the handful of lines near the cursor
//! - [`ContentHash`]: a SHA-256 of the whole buffer, used as the result-cache
//!   key for small documents where a full recompute is still memoizable
//!
//! Equal text always produces equal fingerprints. The 64-bit line hash
//! accepts a negligible collision risk; nothing structural depends on
//! collision freedom.

use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};

/// 64-bit fingerprint of one line's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFingerprint(u64);

/// Fingerprint a single line
pub fn line_fingerprint(text: &str) -> LineFingerprint {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    text.hash(&mut hasher);
    LineFingerprint(hasher.finish())
}

/// SHA-256 of whole-buffer content
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl std::fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First 8 bytes are plenty for log output
        write!(f, "ContentHash(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…)")
    }
}

/// Hash a buffer presented as an iterator of lines, newline-delimited, so no
/// joined copy of the buffer is ever materialized
pub fn content_hash_lines<'a>(lines: impl Iterator<Item = &'a str>) -> ContentHash {
    let mut hasher = Sha256::new();
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    ContentHash(hasher.finalize().into())
}
