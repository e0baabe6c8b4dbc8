//! Differential change detection
//!
//! Remembers a fingerprint per line and reports exactly the lines whose
//! fingerprint differs since the previous check. The check is biased toward
//! the cursor: while the cursor stays put, only the cursor line and its two
//! neighbors are examined, which bounds per-keystroke cost to O(1) lines.
//! When the cursor jumped, the whole span between the old and new cursor
//! positions is examined so paste and find-replace edits are still caught.

use crate::fingerprint::{line_fingerprint, LineFingerprint};
use crate::host::{DocumentId, EditorHost, HostError};
use std::collections::HashMap;

/// Whether a change was confined to the cursor's neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeScope {
    /// Every changed line lies within a small window around the cursor
    Localized,
    /// Changes span a wider range (or this is a cold start)
    Broad,
}

/// The set of lines found changed since the previous check
#[derive(Debug, Clone)]
pub struct ChangeReport {
    /// Changed line numbers, ascending
    pub lines: Vec<usize>,
    pub scope: ChangeScope,
}

impl ChangeReport {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Per-document line fingerprint map
pub struct LineTracker {
    fingerprints: HashMap<usize, LineFingerprint>,
    last_cursor_line: usize,
    cold: bool,
}

impl LineTracker {
    pub fn new() -> Self {
        Self {
            fingerprints: HashMap::new(),
            last_cursor_line: 1,
            cold: true,
        }
    }

    /// Report the lines changed since the previous call.
    ///
    /// On the first call every populated line is reported (cold start, the
    /// caller must do a full recompute). Every examined line's fingerprint is
    /// updated, including lines found unchanged.
    pub fn report_changes(
        &mut self,
        host: &dyn EditorHost,
        doc: DocumentId,
        localized_window: usize,
    ) -> Result<ChangeReport, HostError> {
        let total = host.total_lines(doc)?;
        self.prune_beyond(total);

        if self.cold {
            let lines = self.check_range(host, doc, 1, total)?;
            self.last_cursor_line = host.cursor_line(doc).unwrap_or(1);
            self.cold = false;
            return Ok(ChangeReport {
                lines,
                scope: ChangeScope::Broad,
            });
        }

        let cursor = host.cursor_line(doc)?.clamp(1, total.max(1));
        let previous = self.last_cursor_line;

        let (start, end) = if cursor.abs_diff(previous) <= 1 {
            // Single-edit fast path: cursor line plus immediate neighbors
            (cursor.saturating_sub(1).max(1), (cursor + 1).min(total))
        } else {
            // Cursor jumped: examine the whole span it crossed
            let low = cursor.min(previous).saturating_sub(1).max(1);
            let high = (cursor.max(previous) + 1).min(total);
            (low, high)
        };

        let lines = self.check_range(host, doc, start, end)?;
        self.last_cursor_line = cursor;

        let scope = if lines
            .iter()
            .all(|&line| line.abs_diff(cursor) <= localized_window)
        {
            ChangeScope::Localized
        } else {
            ChangeScope::Broad
        };

        Ok(ChangeReport { lines, scope })
    }

    /// Drop all fingerprints; the next report is a cold start
    pub fn invalidate(&mut self) {
        self.fingerprints.clear();
        self.cold = true;
    }

    /// Check `start..=end` and return the lines whose fingerprint differs
    fn check_range(
        &mut self,
        host: &dyn EditorHost,
        doc: DocumentId,
        start: usize,
        end: usize,
    ) -> Result<Vec<usize>, HostError> {
        let mut changed = Vec::new();
        for line in start..=end {
            let text = host.line_text(doc, line)?;
            let fingerprint = line_fingerprint(&text);
            if self.fingerprints.get(&line) != Some(&fingerprint) {
                self.fingerprints.insert(line, fingerprint);
                changed.push(line);
            }
        }
        Ok(changed)
    }

    /// Forget fingerprints past the current end of the buffer
    fn prune_beyond(&mut self, total: usize) {
        self.fingerprints.retain(|&line, _| line <= total);
    }
}

impl Default for LineTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticHost;

    const DOC: DocumentId = DocumentId(1);

    #[test]
    fn test_cold_start_reports_all_lines() {
        let host = StaticHost::numbered(5);
        let mut tracker = LineTracker::new();
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert_eq!(report.lines, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.scope, ChangeScope::Broad);
    }

    #[test]
    fn test_no_edit_reports_nothing() {
        let host = StaticHost::numbered(5);
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_single_edit_at_cursor_is_localized() {
        let mut host = StaticHost::numbered(50);
        host.cursor = 10;
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();

        host.set_line(10, "edited");
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert_eq!(report.lines, vec![10]);
        assert_eq!(report.scope, ChangeScope::Localized);
    }

    #[test]
    fn test_cursor_jump_checks_crossed_span() {
        let mut host = StaticHost::numbered(50);
        host.cursor = 5;
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();

        // Multi-line paste between the old and new cursor positions
        host.set_line(12, "pasted a");
        host.set_line(13, "pasted b");
        host.cursor = 20;
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert_eq!(report.lines, vec![12, 13]);
        assert_eq!(report.scope, ChangeScope::Broad);
    }

    #[test]
    fn test_unchanged_neighbors_are_not_reported() {
        let mut host = StaticHost::numbered(30);
        host.cursor = 15;
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();

        host.set_line(15, "only this one");
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert_eq!(report.lines, vec![15]);
    }

    #[test]
    fn test_invalidate_forces_full_report() {
        let host = StaticHost::numbered(4);
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();
        tracker.invalidate();
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert_eq!(report.lines, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_shrunk_buffer_prunes_stale_fingerprints() {
        let mut host = StaticHost::numbered(10);
        let mut tracker = LineTracker::new();
        tracker.report_changes(&host, DOC, 5).unwrap();

        host.lines.truncate(3);
        host.cursor = 2;
        tracker.report_changes(&host, DOC, 5).unwrap();

        // Re-growing the buffer must re-report the re-populated lines
        host.lines.push("line 4".to_string());
        host.cursor = 4;
        let report = tracker.report_changes(&host, DOC, 5).unwrap();
        assert!(report.lines.contains(&4));
    }

    #[test]
    fn test_host_error_propagates() {
        let mut host = StaticHost::numbered(5);
        host.torn_down = true;
        let mut tracker = LineTracker::new();
        assert!(tracker.report_changes(&host, DOC, 5).is_err());
    }
}
