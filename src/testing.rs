//! Shared fake host for unit tests

use crate::host::{DocumentId, EditorHost, HostError, TimerId};
use crate::outline::OutlineEntry;
use crate::status::StatusCounters;
use crate::tokenizer::StyleSpan;
use crate::viewport::ViewportWindow;
use std::time::Duration;

/// In-memory host backed by a `Vec<String>` of lines. Timers are recorded,
/// never fired; tests drive `Engine::handle_timer` themselves.
pub(crate) struct StaticHost {
    pub lines: Vec<String>,
    pub cursor: usize,
    pub view_fractions: (f64, f64),
    /// When set, all metric reads fail as if the widget was torn down
    pub torn_down: bool,
    pub next_timer: u64,
    pub armed: Vec<(TimerId, DocumentId, Duration)>,
    pub cancelled: Vec<TimerId>,
    pub styled: Vec<(usize, Vec<StyleSpan>)>,
    pub outlines: Vec<Vec<OutlineEntry>>,
    pub counter_updates: Vec<StatusCounters>,
    pub gutter_refreshes: Vec<ViewportWindow>,
}

impl StaticHost {
    pub fn with_lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: 1,
            view_fractions: (0.0, 1.0),
            torn_down: false,
            next_timer: 0,
            armed: Vec::new(),
            cancelled: Vec::new(),
            styled: Vec::new(),
            outlines: Vec::new(),
            counter_updates: Vec::new(),
            gutter_refreshes: Vec::new(),
        }
    }

    pub fn numbered(count: usize) -> Self {
        Self::with_lines((1..=count).map(|i| format!("line {i}")).collect())
    }

    pub fn set_line(&mut self, line: usize, text: &str) {
        self.lines[line - 1] = text.to_string();
    }

    /// The most recently armed timer that was not cancelled
    pub fn active_timer(&self) -> Option<(TimerId, DocumentId)> {
        self.armed
            .iter()
            .rev()
            .find(|(id, _, _)| !self.cancelled.contains(id))
            .map(|(id, doc, _)| (*id, *doc))
    }
}

impl EditorHost for StaticHost {
    fn total_lines(&self, _doc: DocumentId) -> Result<usize, HostError> {
        if self.torn_down {
            return Err(HostError::MetricsUnavailable);
        }
        Ok(self.lines.len())
    }

    fn line_text(&self, _doc: DocumentId, line: usize) -> Result<String, HostError> {
        if self.torn_down {
            return Err(HostError::DocumentClosed);
        }
        self.lines
            .get(line.wrapping_sub(1))
            .cloned()
            .ok_or(HostError::MetricsUnavailable)
    }

    fn cursor_line(&self, _doc: DocumentId) -> Result<usize, HostError> {
        if self.torn_down {
            return Err(HostError::MetricsUnavailable);
        }
        Ok(self.cursor)
    }

    fn visible_fraction_range(&self, _doc: DocumentId) -> Result<(f64, f64), HostError> {
        if self.torn_down {
            return Err(HostError::MetricsUnavailable);
        }
        Ok(self.view_fractions)
    }

    fn set_timer(&mut self, doc: DocumentId, delay: Duration) -> TimerId {
        self.next_timer += 1;
        let id = TimerId(self.next_timer);
        self.armed.push((id, doc, delay));
        id
    }

    fn cancel_timer(&mut self, timer: TimerId) {
        self.cancelled.push(timer);
    }

    fn apply_style_spans(&mut self, _doc: DocumentId, line: usize, spans: &[StyleSpan]) {
        self.styled.push((line, spans.to_vec()));
    }

    fn outline_updated(&mut self, _doc: DocumentId, outline: &[OutlineEntry]) {
        self.outlines.push(outline.to_vec());
    }

    fn counters_updated(&mut self, _doc: DocumentId, counters: &StatusCounters) {
        self.counter_updates.push(counters.clone());
    }

    fn gutter_refresh(&mut self, _doc: DocumentId, window: ViewportWindow) {
        self.gutter_refreshes.push(window);
    }
}
