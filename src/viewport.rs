//! Viewport tracking
//!
//! Estimates the visible line range from the host's scroll fractions, plus a
//! safety margin, so styling and gutter work can be restricted to what the
//! user can actually see. A scroll only counts as "moved" past a threshold
//! proportional to the window's own height, which keeps sub-pixel scroll
//! events from retriggering work on large documents.

use crate::config::ViewportConfig;
use crate::host::{DocumentId, EditorHost};

/// The currently visible line range, including the safety margin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportWindow {
    /// First line of the window (1-based, margin applied)
    pub first_line: usize,
    /// Last line of the window (inclusive, margin applied)
    pub last_line: usize,
    /// The margin that was applied on each side
    pub margin: usize,
}

impl ViewportWindow {
    pub fn height(&self) -> usize {
        self.last_line.saturating_sub(self.first_line) + 1
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.first_line && line <= self.last_line
    }
}

/// Per-document viewport state
pub struct ViewportTracker {
    window: ViewportWindow,
}

impl ViewportTracker {
    pub fn new(config: &ViewportConfig) -> Self {
        Self {
            window: ViewportWindow {
                first_line: 1,
                last_line: 1,
                margin: config.margin_lines,
            },
        }
    }

    /// Compute the current window from host scroll metrics.
    ///
    /// If the host cannot report metrics (widget torn down mid-call) the last
    /// known window is returned unchanged.
    pub fn current_window(
        &self,
        host: &dyn EditorHost,
        doc: DocumentId,
        config: &ViewportConfig,
    ) -> ViewportWindow {
        match self.compute(host, doc, config) {
            Some(window) => window,
            None => self.window,
        }
    }

    /// Check whether the viewport moved past the significance threshold.
    ///
    /// Only a significant move updates the stored window and returns true;
    /// smaller wobbles leave the stored window untouched.
    pub fn has_moved_significantly(
        &mut self,
        host: &dyn EditorHost,
        doc: DocumentId,
        config: &ViewportConfig,
    ) -> bool {
        let Some(new) = self.compute(host, doc, config) else {
            return false;
        };

        let height = self.window.height();
        let threshold = ((height as f64 * config.significance_ratio) as usize)
            .max(config.significance_min_lines);

        if new.first_line.abs_diff(self.window.first_line) > threshold
            || new.last_line.abs_diff(self.window.last_line) > threshold
        {
            self.window = new;
            true
        } else {
            false
        }
    }

    /// The last window that passed the significance check
    pub fn last_window(&self) -> ViewportWindow {
        self.window
    }

    fn compute(
        &self,
        host: &dyn EditorHost,
        doc: DocumentId,
        config: &ViewportConfig,
    ) -> Option<ViewportWindow> {
        let total = host.total_lines(doc).ok()?;
        let (top, bottom) = host.visible_fraction_range(doc).ok()?;
        if total == 0 {
            return None;
        }

        let margin = config.margin_lines;
        let top_line = (top * total as f64) as usize;
        let bottom_line = (bottom * total as f64) as usize;
        let first_line = top_line.saturating_sub(margin).max(1);
        let last_line = (bottom_line + margin).min(total).max(first_line);

        Some(ViewportWindow {
            first_line,
            last_line,
            margin,
        })
    }
}
