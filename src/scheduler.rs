//! Update request model and debounce arithmetic
//!
//! An edit or scroll event asks for a set of update kinds. At most one
//! pending request exists per document; concurrent requests merge by union
//! and re-arm at the slowest merged kind's delay, so expensive kinds are
//! never shortchanged by a cheap kind arriving later.

use crate::adaptive::{AdaptiveState, SizeCategory};
use crate::config::{DelayConfig, EngineConfig, MinIntervalConfig};
use crate::fingerprint::ContentHash;
use crate::host::TimerId;
use std::time::{Duration, Instant};

/// One kind of derived view to refresh. "Refresh everything" is spelled
/// [`KindSet::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Styling,
    Outline,
    StatusCounters,
    LineNumberGutter,
}

pub const ALL_KINDS: [UpdateKind; 4] = [
    UpdateKind::Styling,
    UpdateKind::Outline,
    UpdateKind::StatusCounters,
    UpdateKind::LineNumberGutter,
];

impl UpdateKind {
    pub(crate) fn index(self) -> usize {
        match self {
            UpdateKind::Styling => 0,
            UpdateKind::Outline => 1,
            UpdateKind::StatusCounters => 2,
            UpdateKind::LineNumberGutter => 3,
        }
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }

    fn delay_multiplier(self, delays: &DelayConfig) -> f64 {
        match self {
            UpdateKind::Styling => delays.styling_multiplier,
            UpdateKind::Outline => delays.outline_multiplier,
            UpdateKind::StatusCounters => delays.status_multiplier,
            UpdateKind::LineNumberGutter => delays.gutter_multiplier,
        }
    }

    pub(crate) fn min_interval(self, intervals: &MinIntervalConfig) -> Duration {
        let ms = match self {
            UpdateKind::Styling => intervals.styling_ms,
            UpdateKind::Outline => intervals.outline_ms,
            UpdateKind::StatusCounters => intervals.status_ms,
            UpdateKind::LineNumberGutter => intervals.gutter_ms,
        };
        Duration::from_millis(ms)
    }
}

/// A set of update kinds. Merging is always by union.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KindSet(u8);

impl KindSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// All four kinds (the "All" shorthand)
    pub fn all() -> Self {
        ALL_KINDS.iter().fold(Self::empty(), |set, &k| set.with(k))
    }

    pub fn single(kind: UpdateKind) -> Self {
        Self(kind.bit())
    }

    #[must_use]
    pub fn with(self, kind: UpdateKind) -> Self {
        Self(self.0 | kind.bit())
    }

    #[must_use]
    pub fn without(self, kind: UpdateKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn contains(self, kind: UpdateKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = UpdateKind> {
        ALL_KINDS.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<UpdateKind> for KindSet {
    fn from(kind: UpdateKind) -> Self {
        Self::single(kind)
    }
}

impl FromIterator<UpdateKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = UpdateKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), KindSet::with)
    }
}

/// Immutable snapshot captured when a request is armed, handed unchanged to
/// the dispatcher when the timer fires. Execution never reads mutable
/// scheduling state that a newer request may have touched.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub line_count: usize,
    pub category: SizeCategory,
    /// Whole-buffer hash; only computed for small documents, where the
    /// result cache applies
    pub content_hash: Option<ContentHash>,
    pub armed_at: Instant,
}

/// The single pending request a document may carry
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub kinds: KindSet,
    pub timer: TimerId,
    pub delay: Duration,
    pub context: RequestContext,
}

/// Debounce delay for a merged kind set: the max over kinds of
/// `base(category) × kind_multiplier × adaptive_multiplier(category)`
pub fn debounce_delay(
    config: &EngineConfig,
    adaptive: &AdaptiveState,
    category: SizeCategory,
    kinds: KindSet,
) -> Duration {
    let base_ms = match category {
        SizeCategory::Small => config.delays.small_ms,
        SizeCategory::Large => config.delays.large_ms,
        SizeCategory::Huge => config.delays.huge_ms,
    } as f64;
    let adaptive_multiplier = adaptive.delay_multiplier(category);

    let delay_ms = kinds
        .iter()
        .map(|kind| base_ms * kind.delay_multiplier(&config.delays) * adaptive_multiplier)
        .fold(0.0_f64, f64::max);

    Duration::from_millis(delay_ms as u64)
}

/// Drop kinds executed more recently than their minimum interval. Redundant
/// triggers for cheap, frequently-invalidated kinds die here.
pub fn gate_min_interval(
    kinds: KindSet,
    last_run: &[Option<Instant>; 4],
    intervals: &MinIntervalConfig,
    now: Instant,
) -> KindSet {
    kinds
        .iter()
        .filter(|kind| match last_run[kind.index()] {
            Some(at) => now.duration_since(at) >= kind.min_interval(intervals),
            None => true,
        })
        .collect()
}
