//! Adaptive timing control loop
//!
//! Records how long update passes actually take, per document size category,
//! and periodically nudges that category's delay multiplier: slow means back
//! off, fast means tighten, with distinct slow/fast bounds (hysteresis) and
//! hard floor/ceiling so the loop can neither oscillate around a single
//! boundary nor run away. Deterministic given a latency history.

use crate::config::{AdaptiveConfig, SizeThresholds};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Document size classification driving strategy and delay selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeCategory {
    Small,
    Large,
    Huge,
}

pub const ALL_CATEGORIES: [SizeCategory; 3] =
    [SizeCategory::Small, SizeCategory::Large, SizeCategory::Huge];

impl SizeCategory {
    /// Classify a document by line count
    pub fn classify(line_count: usize, thresholds: &SizeThresholds) -> Self {
        if line_count < thresholds.large_lines {
            SizeCategory::Small
        } else if line_count < thresholds.huge_lines {
            SizeCategory::Large
        } else {
            SizeCategory::Huge
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            SizeCategory::Small => 0,
            SizeCategory::Large => 1,
            SizeCategory::Huge => 2,
        }
    }
}

/// Rolling window of observed pass durations, per size category
pub struct LatencyHistory {
    samples: [VecDeque<Duration>; 3],
    capacity: usize,
}

impl LatencyHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: [VecDeque::new(), VecDeque::new(), VecDeque::new()],
            capacity: capacity.max(1),
        }
    }

    /// Record one pass duration, dropping the oldest sample past capacity
    pub fn record(&mut self, category: SizeCategory, duration: Duration) {
        let window = &mut self.samples[category.index()];
        if window.len() == self.capacity {
            window.pop_front();
        }
        window.push_back(duration);
    }

    /// Mean over the newest `window` samples, if at least `min_samples` exist
    fn recent_mean(&self, category: SizeCategory, window: usize, min_samples: usize) -> Option<Duration> {
        let samples = &self.samples[category.index()];
        let take = window.min(samples.len());
        if take < min_samples || take == 0 {
            return None;
        }
        let total: Duration = samples.iter().rev().take(take).sum();
        Some(total / take as u32)
    }

    pub fn clear(&mut self) {
        for window in &mut self.samples {
            window.clear();
        }
    }

    fn stats(&self, category: SizeCategory) -> Option<CategoryStats> {
        let samples = &self.samples[category.index()];
        if samples.is_empty() {
            return None;
        }
        let total: Duration = samples.iter().sum();
        let min = samples.iter().min().copied().unwrap_or_default();
        let max = samples.iter().max().copied().unwrap_or_default();
        Some(CategoryStats {
            avg_ms: total.as_secs_f64() * 1000.0 / samples.len() as f64,
            min_ms: min.as_secs_f64() * 1000.0,
            max_ms: max.as_secs_f64() * 1000.0,
            samples: samples.len(),
        })
    }
}

/// Per-category tuning knobs, read by every delay computation
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveThreshold {
    pub delay_multiplier: f64,
    pub skip_threshold: f64,
}

/// The control-loop state: current thresholds plus the analysis clock
pub struct AdaptiveState {
    thresholds: [AdaptiveThreshold; 3],
    last_analysis: Instant,
}

impl AdaptiveState {
    pub fn new() -> Self {
        Self {
            // Larger documents start with more conservative debouncing
            thresholds: [
                AdaptiveThreshold {
                    delay_multiplier: 1.0,
                    skip_threshold: 0.1,
                },
                AdaptiveThreshold {
                    delay_multiplier: 1.5,
                    skip_threshold: 0.2,
                },
                AdaptiveThreshold {
                    delay_multiplier: 3.0,
                    skip_threshold: 0.5,
                },
            ],
            last_analysis: Instant::now(),
        }
    }

    pub fn delay_multiplier(&self, category: SizeCategory) -> f64 {
        self.thresholds[category.index()].delay_multiplier
    }

    pub fn threshold(&self, category: SizeCategory) -> AdaptiveThreshold {
        self.thresholds[category.index()]
    }

    /// Run the analysis step if the configured interval has elapsed
    pub fn maybe_analyze(
        &mut self,
        now: Instant,
        history: &LatencyHistory,
        config: &AdaptiveConfig,
    ) -> bool {
        if now.duration_since(self.last_analysis)
            < Duration::from_secs(config.analysis_interval_secs)
        {
            return false;
        }
        self.last_analysis = now;
        self.analyze(history, config);
        true
    }

    /// One deterministic analysis pass over the latency history.
    ///
    /// A category without enough recent samples is left untouched, so
    /// thresholds always hold their last valid values.
    pub fn analyze(&mut self, history: &LatencyHistory, config: &AdaptiveConfig) {
        let slow = Duration::from_millis(config.slow_bound_ms);
        let fast = Duration::from_millis(config.fast_bound_ms);

        for category in ALL_CATEGORIES {
            let Some(mean) = history.recent_mean(category, config.recent_window, config.min_samples)
            else {
                continue;
            };
            let entry = &mut self.thresholds[category.index()];

            if mean > slow {
                entry.delay_multiplier =
                    (entry.delay_multiplier * config.backoff_ratio).min(config.multiplier_ceiling);
                entry.skip_threshold =
                    (entry.skip_threshold * config.skip_ratio).min(config.skip_ceiling);
                tracing::debug!(
                    ?category,
                    mean_ms = mean.as_millis() as u64,
                    multiplier = entry.delay_multiplier,
                    "slow updates, backing off"
                );
            } else if mean < fast {
                entry.delay_multiplier =
                    (entry.delay_multiplier * config.recovery_ratio).max(config.multiplier_floor);
                tracing::debug!(
                    ?category,
                    mean_ms = mean.as_millis() as u64,
                    multiplier = entry.delay_multiplier,
                    "fast updates, tightening"
                );
            }
        }
    }
}

impl Default for AdaptiveState {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency statistics for one size category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub samples: usize,
}

/// Diagnostics snapshot exposed to the host
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    pub small: Option<CategoryStats>,
    pub large: Option<CategoryStats>,
    pub huge: Option<CategoryStats>,
}

impl EngineStatistics {
    pub(crate) fn from_history(history: &LatencyHistory) -> Self {
        Self {
            small: history.stats(SizeCategory::Small),
            large: history.stats(SizeCategory::Large),
            huge: history.stats(SizeCategory::Huge),
        }
    }
}
