//! End-to-end scheduling scenarios driven through the public API.
//!
//! Timers are never really started: the host records each armed timer and
//! the test fires it by calling `Engine::handle_timer`, which is exactly the
//! contract a real event loop follows.

use noctern_engine::{
    DocumentId, EditorHost, Engine, EngineConfig, HostError, KindSet, OutlineEntry, StatusCounters,
    StyleSpan, TimerId, UpdateKind, ViewportWindow,
};
use std::time::Duration;

const DOC: DocumentId = DocumentId(1);

/// Scripted in-memory host; the test owns the clock and the timers.
#[derive(Default)]
struct ScriptedHost {
    lines: Vec<String>,
    cursor: usize,
    view_fractions: (f64, f64),
    next_timer: u64,
    armed: Vec<(TimerId, DocumentId, Duration)>,
    cancelled: Vec<TimerId>,
    fired: Vec<TimerId>,
    styled: Vec<(usize, Vec<StyleSpan>)>,
    outlines: Vec<Vec<OutlineEntry>>,
    counter_updates: Vec<StatusCounters>,
    gutter_refreshes: Vec<ViewportWindow>,
}

impl ScriptedHost {
    fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            cursor: 1,
            view_fractions: (0.0, 1.0),
            ..Self::default()
        }
    }

    fn numbered(count: usize) -> Self {
        Self::new((1..=count).map(|i| format!("Body text on line {i}.")).collect())
    }

    fn active_timer(&self) -> Option<TimerId> {
        self.armed
            .iter()
            .rev()
            .map(|(id, _, _)| *id)
            .find(|id| !self.cancelled.contains(id) && !self.fired.contains(id))
    }

    fn fire(&mut self, engine: &mut Engine) {
        let timer = self.active_timer().expect("a timer should be armed");
        self.fired.push(timer);
        engine.handle_timer(self, DOC, timer);
    }

    fn styled_lines(&self) -> Vec<usize> {
        self.styled.iter().map(|(line, _)| *line).collect()
    }
}

impl EditorHost for ScriptedHost {
    fn total_lines(&self, _doc: DocumentId) -> Result<usize, HostError> {
        Ok(self.lines.len())
    }

    fn line_text(&self, _doc: DocumentId, line: usize) -> Result<String, HostError> {
        self.lines
            .get(line.wrapping_sub(1))
            .cloned()
            .ok_or(HostError::MetricsUnavailable)
    }

    fn cursor_line(&self, _doc: DocumentId) -> Result<usize, HostError> {
        Ok(self.cursor)
    }

    fn visible_fraction_range(&self, _doc: DocumentId) -> Result<(f64, f64), HostError> {
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

#[test]
fn localized_edit_in_large_document_restyles_neighborhood_only() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(3000);
    host.cursor = 10;

    // Cold start: one full pass seeds the fingerprints
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), true);
    host.fire(&mut engine);
    assert_eq!(host.styled.len(), 3000);
    host.styled.clear();

    host.lines[9] = "\\textbf{edited} text".to_string();
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), true);
    host.fire(&mut engine);

    let styled = host.styled_lines();
    assert!(!styled.is_empty());
    assert!(
        styled.iter().all(|line| (9..=11).contains(line)),
        "restyled lines {styled:?} should stay near the cursor"
    );
}

#[test]
fn huge_document_styling_touches_viewport_only() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(20_000);
    host.view_fractions = (0.5, 0.505);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), false);
    host.fire(&mut engine);

    let styled = host.styled_lines();
    assert!(!styled.is_empty());
    assert!(styled.len() < 300, "styled {} lines of 20k", styled.len());
    assert!(styled.iter().all(|&line| (9950..=10_150).contains(&line)));
}

#[test]
fn burst_of_requests_coalesces_into_one_pass() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::new(vec!["\\section{A}".to_string(), "words".to_string()]);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), false);
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Outline), false);
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::StatusCounters), false);

    // Each merge cancels the previous timer; exactly one stays live
    assert_eq!(host.armed.len(), 3);
    assert_eq!(host.cancelled.len(), 2);
    let live: Vec<_> = host
        .armed
        .iter()
        .filter(|(id, _, _)| !host.cancelled.contains(id))
        .collect();
    assert_eq!(live.len(), 1);
    // Outline is the slowest merged kind: 100ms base x 2.0
    assert_eq!(live[0].2, Duration::from_millis(200));

    host.fire(&mut engine);
    assert!(!host.styled.is_empty());
    assert_eq!(host.outlines.len(), 1);
    assert_eq!(host.counter_updates.len(), 1);
    assert!(engine.pending_kinds(DOC).is_none());
}

#[test]
fn minimum_interval_gate_drops_rapid_repeats() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(30);

    engine.request_update(
        &mut host,
        DOC,
        KindSet::single(UpdateKind::LineNumberGutter),
        false,
    );
    host.fire(&mut engine);
    assert_eq!(host.gutter_refreshes.len(), 1);

    // Immediately after the pass the 50ms gutter interval has not elapsed
    engine.request_update(
        &mut host,
        DOC,
        KindSet::single(UpdateKind::LineNumberGutter),
        false,
    );
    assert!(engine.pending_kinds(DOC).is_none());
    assert!(host.active_timer().is_none());
}

#[test]
fn force_bypasses_minimum_interval_gate() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(30);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::StatusCounters), false);
    host.fire(&mut engine);
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::StatusCounters), true);
    host.fire(&mut engine);
    assert_eq!(host.counter_updates.len(), 2);
}

#[test]
fn closing_a_document_cancels_its_pending_timer() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(10);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), false);
    let timer = host.active_timer().unwrap();
    engine.close_document(&mut host, DOC);

    assert!(host.cancelled.contains(&timer));
    engine.handle_timer(&mut host, DOC, timer);
    assert!(host.styled.is_empty());
}

#[test]
fn statistics_report_one_sample_per_completed_pass() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(10);

    for _ in 0..3 {
        engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), true);
        host.fire(&mut engine);
    }

    let stats = engine.get_statistics();
    let small = stats.small.expect("small-category samples recorded");
    assert_eq!(small.samples, 3);
    assert!(small.max_ms >= small.min_ms);
    assert!(stats.large.is_none());
    assert!(stats.huge.is_none());
}

#[test]
fn cache_clear_forces_full_restyle_of_large_document() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::numbered(2500);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), true);
    host.fire(&mut engine);
    host.styled.clear();

    // Fingerprints dropped: the next pass is a cold start again
    engine.clear_all_caches();
    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Styling), true);
    host.fire(&mut engine);
    assert_eq!(host.styled.len(), 2500);
}

#[test]
fn outline_entries_reflect_document_structure() {
    let mut engine = Engine::new(EngineConfig::default());
    let mut host = ScriptedHost::new(vec![
        "\\documentclass{article}".to_string(),
        "\\section{Introduction}".to_string(),
        "text".to_string(),
        "\\subsection{Background}".to_string(),
        "  \\section{Methods}".to_string(),
    ]);

    engine.request_update(&mut host, DOC, KindSet::single(UpdateKind::Outline), false);
    host.fire(&mut engine);

    let outline = &host.outlines[0];
    let titles: Vec<&str> = outline.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Introduction", "Background", "Methods"]);
    assert_eq!(outline[0].line, 2);
    assert_eq!(outline[2].line, 5);
}
