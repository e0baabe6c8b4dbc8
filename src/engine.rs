//! Engine façade and per-document lifecycle
//!
//! The engine owns a registry of per-document state keyed by an explicit
//! [`DocumentId`]; documents are opened on first use and released
//! deterministically by [`Engine::close_document`]. The scheduling state
//! machine per document is `Idle → Pending → Executing → Idle`, enforced
//! structurally: the single `Option<PendingRequest>` is the entire machine,
//! and everything runs on the host's event loop, so no two passes for the
//! same document can ever overlap.

use crate::adaptive::{AdaptiveState, EngineStatistics, LatencyHistory, SizeCategory};
use crate::cache::ResultCache;
use crate::change_tracker::LineTracker;
use crate::config::EngineConfig;
use crate::fingerprint::{content_hash_lines, ContentHash};
use crate::host::{DocumentId, EditorHost, HostError, TimerId};
use crate::scheduler::{debounce_delay, gate_min_interval, KindSet, PendingRequest, RequestContext, UpdateKind};
use crate::viewport::ViewportTracker;
use std::collections::HashMap;
use std::time::Instant;

/// Everything the engine remembers about one open document
pub(crate) struct DocState {
    pub tracker: LineTracker,
    pub viewport: ViewportTracker,
    pub pending: Option<PendingRequest>,
    /// Last execution time per update kind, for the minimum-interval gate
    pub last_run: [Option<Instant>; 4],
    pub last_outline_pass: Option<Instant>,
}

impl DocState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            tracker: LineTracker::new(),
            viewport: ViewportTracker::new(&config.viewport),
            pending: None,
            last_run: [None; 4],
            last_outline_pass: None,
        }
    }
}

/// The adaptive incremental update engine
pub struct Engine {
    pub(crate) config: EngineConfig,
    pub(crate) cache: ResultCache,
    pub(crate) history: LatencyHistory,
    pub(crate) adaptive: AdaptiveState,
    pub(crate) docs: HashMap<DocumentId, DocState>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = ResultCache::new(&config.cache);
        let history = LatencyHistory::new(config.adaptive.history_capacity);
        Self {
            config,
            cache,
            history,
            adaptive: AdaptiveState::new(),
            docs: HashMap::new(),
        }
    }

    /// Register a document. Requests for unknown documents also open them
    /// implicitly; this exists so hosts can pay the allocation up front.
    pub fn open_document(&mut self, doc: DocumentId) {
        self.docs
            .entry(doc)
            .or_insert_with(|| DocState::new(&self.config));
    }

    /// Release every per-document structure and cancel any pending timer.
    /// After this, a timer that still fires for `doc` is a safe no-op.
    pub fn close_document(&mut self, host: &mut dyn EditorHost, doc: DocumentId) {
        if let Some(state) = self.docs.remove(&doc) {
            if let Some(pending) = state.pending {
                host.cancel_timer(pending.timer);
            }
            tracing::debug!(%doc, "document closed, engine state released");
        }
    }

    pub fn is_open(&self, doc: DocumentId) -> bool {
        self.docs.contains_key(&doc)
    }

    /// The sole trigger entry point, called on every edit, scroll, or
    /// explicit refresh.
    ///
    /// Coalesces into the document's pending request if one exists (union of
    /// kinds, re-armed at the slowest merged kind's delay), otherwise arms a
    /// fresh timer. Without `force`, kinds executed more recently than their
    /// minimum interval are dropped.
    pub fn request_update(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        kinds: KindSet,
        force: bool,
    ) {
        let now = Instant::now();
        self.adaptive
            .maybe_analyze(now, &self.history, &self.config.adaptive);

        let requested = self.supported_kinds(kinds);
        if requested.is_empty() {
            return;
        }

        let context = build_context(&*host, doc, &self.config, now);
        let state = self
            .docs
            .entry(doc)
            .or_insert_with(|| DocState::new(&self.config));

        let previous = state.pending.take();
        let mut merged = requested;
        if let Some(prev) = &previous {
            merged = merged.union(prev.kinds);
        }
        if !force {
            merged = gate_min_interval(merged, &state.last_run, &self.config.min_intervals, now);
        }

        if let Some(prev) = previous {
            host.cancel_timer(prev.timer);
        }
        if merged.is_empty() {
            tracing::debug!(%doc, "all requested kinds inside their minimum interval");
            return;
        }

        let delay = debounce_delay(&self.config, &self.adaptive, context.category, merged);
        let timer = host.set_timer(doc, delay);
        tracing::debug!(
            %doc,
            ?merged,
            delay_ms = delay.as_millis() as u64,
            lines = context.line_count,
            category = ?context.category,
            "update scheduled"
        );
        state.pending = Some(PendingRequest {
            kinds: merged,
            timer,
            delay,
            context,
        });
    }

    /// Host timer callback. Stale ids (cancelled, already fired, or for a
    /// closed document) are ignored.
    pub fn handle_timer(&mut self, host: &mut dyn EditorHost, doc: DocumentId, timer: TimerId) {
        let Some(state) = self.docs.get_mut(&doc) else {
            tracing::debug!(%doc, "timer fired for closed document, ignored");
            return;
        };

        // Clear the pending record before executing: a request arriving
        // during execution starts a fresh Idle -> Pending cycle.
        let pending = match state.pending.take() {
            Some(pending) if pending.timer == timer => pending,
            other => {
                state.pending = other;
                tracing::debug!(%doc, "stale timer ignored");
                return;
            }
        };

        self.execute(host, doc, pending.kinds, &pending.context);
    }

    /// Per-category latency diagnostics
    pub fn get_statistics(&self) -> EngineStatistics {
        EngineStatistics::from_history(&self.history)
    }

    /// Administrative reset, e.g. after a theme change invalidates every
    /// derived styling artifact. Pending requests stay armed.
    pub fn clear_all_caches(&mut self) {
        self.cache.clear();
        self.history.clear();
        for state in self.docs.values_mut() {
            state.tracker.invalidate();
        }
        tracing::debug!("all engine caches cleared");
    }

    /// Kinds currently pending for a document, if any
    pub fn pending_kinds(&self, doc: DocumentId) -> Option<KindSet> {
        self.docs
            .get(&doc)
            .and_then(|state| state.pending.as_ref())
            .map(|pending| pending.kinds)
    }

    /// Drop kinds whose derived view the host does not support
    fn supported_kinds(&self, kinds: KindSet) -> KindSet {
        let features = &self.config.features;
        let mut kinds = kinds;
        if !features.outline {
            kinds = kinds.without(UpdateKind::Outline);
        }
        if !features.status_counters {
            kinds = kinds.without(UpdateKind::StatusCounters);
        }
        if !features.line_gutter {
            kinds = kinds.without(UpdateKind::LineNumberGutter);
        }
        kinds
    }
}

/// Snapshot the request context at arm time. Metric failures fall back to
/// the most conservative classification instead of erroring: a document we
/// cannot measure is treated as huge.
fn build_context(
    host: &dyn EditorHost,
    doc: DocumentId,
    config: &EngineConfig,
    now: Instant,
) -> RequestContext {
    let (line_count, category) = match host.total_lines(doc) {
        Ok(count) => (count, SizeCategory::classify(count, &config.thresholds)),
        Err(err) => {
            tracing::debug!(%doc, %err, "line count unavailable, assuming huge");
            (0, SizeCategory::Huge)
        }
    };
    let content_hash = match category {
        SizeCategory::Small => hash_document(host, doc, line_count).ok(),
        _ => None,
    };

    RequestContext {
        line_count,
        category,
        content_hash,
        armed_at: now,
    }
}

fn hash_document(
    host: &dyn EditorHost,
    doc: DocumentId,
    total: usize,
) -> Result<ContentHash, HostError> {
    let mut lines = Vec::with_capacity(total);
    for line in 1..=total {
        lines.push(host.line_text(doc, line)?);
    }
    Ok(content_hash_lines(lines.iter().map(String::as_str)))
}
