//! Host editor interface
//!
//! The engine never touches a widget directly. Everything it needs from the
//! editing surface (buffer reads, cursor, scroll metrics, timers) and
//! everything it hands back (style spans, outline, counters, gutter
//! refreshes) goes through [`EditorHost`].
//!
//! Buffer reads are fallible: the host may have torn a document down between
//! the moment a timer was armed and the moment it fires. A [`HostError`]
//! abandons the current pass, it is never fatal.

use crate::outline::OutlineEntry;
use crate::status::StatusCounters;
use crate::tokenizer::StyleSpan;
use crate::viewport::ViewportWindow;
use std::fmt;
use std::time::Duration;

/// Opaque identifier for one open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Handle for a host-scheduled callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// Errors the host can report when the engine reads document state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The document (or its widget) no longer exists
    DocumentClosed,
    /// Line count, cursor, or scroll metrics are currently unavailable
    MetricsUnavailable,
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::DocumentClosed => write!(f, "document is closed"),
            HostError::MetricsUnavailable => write!(f, "document metrics unavailable"),
        }
    }
}

impl std::error::Error for HostError {}

/// The capabilities the engine requires from its host editor.
///
/// Line numbers are 1-based throughout.
pub trait EditorHost {
    /// Total number of lines in the document
    fn total_lines(&self, doc: DocumentId) -> Result<usize, HostError>;

    /// Text of one line, without its trailing newline
    fn line_text(&self, doc: DocumentId, line: usize) -> Result<String, HostError>;

    /// Line the cursor is currently on
    fn cursor_line(&self, doc: DocumentId) -> Result<usize, HostError>;

    /// Visible scroll range as fractions of the document, each in 0.0–1.0
    fn visible_fraction_range(&self, doc: DocumentId) -> Result<(f64, f64), HostError>;

    /// Schedule a callback after `delay`; the host must later invoke
    /// `Engine::handle_timer` with the returned id
    fn set_timer(&mut self, doc: DocumentId, delay: Duration) -> TimerId;

    /// Cancel a previously scheduled callback. Cancelling an id that already
    /// fired, or was already cancelled, is a no-op.
    fn cancel_timer(&mut self, timer: TimerId);

    /// Paint freshly computed style spans for one line
    fn apply_style_spans(&mut self, doc: DocumentId, line: usize, spans: &[StyleSpan]);

    /// Receive a recomputed document outline
    fn outline_updated(&mut self, doc: DocumentId, outline: &[OutlineEntry]);

    /// Receive recomputed status counters
    fn counters_updated(&mut self, doc: DocumentId, counters: &StatusCounters);

    /// Redraw the line-number gutter for the given window
    fn gutter_refresh(&mut self, doc: DocumentId, window: ViewportWindow);
}
