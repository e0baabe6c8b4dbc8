//! Engine configuration
//!
//! Every threshold the scheduler, caches and tokenizer paths consult lives
//! here, so hosts can tune the engine from their own settings file. All
//! fields have serde defaults; an empty JSON object deserializes to the
//! stock configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Line-count thresholds separating small / large / huge documents
    #[serde(default)]
    pub thresholds: SizeThresholds,

    /// Debounce delays and per-kind delay multipliers
    #[serde(default)]
    pub delays: DelayConfig,

    /// Minimum intervals between executions of each update kind
    #[serde(default)]
    pub min_intervals: MinIntervalConfig,

    /// Result cache capacities per artifact category
    #[serde(default)]
    pub cache: CacheConfig,

    /// Viewport margin and scroll-significance thresholds
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Adaptive control-loop bounds
    #[serde(default)]
    pub adaptive: AdaptiveConfig,

    /// Dispatcher behavior (outline cooldown, localized-change window)
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Which derived views the host supports
    #[serde(default)]
    pub features: EngineFeatures,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: SizeThresholds::default(),
            delays: DelayConfig::default(),
            min_intervals: MinIntervalConfig::default(),
            cache: CacheConfig::default(),
            viewport: ViewportConfig::default(),
            adaptive: AdaptiveConfig::default(),
            dispatch: DispatchConfig::default(),
            features: EngineFeatures::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse engine config")
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json_str(&contents)
    }
}

/// Line-count thresholds for document size classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeThresholds {
    /// Documents with at least this many lines are "large"
    #[serde(default = "default_large_lines")]
    pub large_lines: usize,

    /// Documents with at least this many lines are "huge"
    #[serde(default = "default_huge_lines")]
    pub huge_lines: usize,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            large_lines: default_large_lines(),
            huge_lines: default_huge_lines(),
        }
    }
}

/// Base debounce delays per size category, plus per-kind multipliers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayConfig {
    #[serde(default = "default_small_delay_ms")]
    pub small_ms: u64,

    #[serde(default = "default_large_delay_ms")]
    pub large_ms: u64,

    #[serde(default = "default_huge_delay_ms")]
    pub huge_ms: u64,

    /// Styling is the baseline kind
    #[serde(default = "default_styling_multiplier")]
    pub styling_multiplier: f64,

    /// Outline parsing is expensive, debounce it harder
    #[serde(default = "default_outline_multiplier")]
    pub outline_multiplier: f64,

    /// Status counters are cheap
    #[serde(default = "default_status_multiplier")]
    pub status_multiplier: f64,

    /// The gutter is the cheapest derived view
    #[serde(default = "default_gutter_multiplier")]
    pub gutter_multiplier: f64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            small_ms: default_small_delay_ms(),
            large_ms: default_large_delay_ms(),
            huge_ms: default_huge_delay_ms(),
            styling_multiplier: default_styling_multiplier(),
            outline_multiplier: default_outline_multiplier(),
            status_multiplier: default_status_multiplier(),
            gutter_multiplier: default_gutter_multiplier(),
        }
    }
}

/// Minimum interval between two executions of the same update kind for one
/// document. A non-forced request inside the interval is dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinIntervalConfig {
    #[serde(default = "default_styling_interval_ms")]
    pub styling_ms: u64,

    #[serde(default = "default_outline_interval_ms")]
    pub outline_ms: u64,

    #[serde(default = "default_status_interval_ms")]
    pub status_ms: u64,

    #[serde(default = "default_gutter_interval_ms")]
    pub gutter_ms: u64,
}

impl Default for MinIntervalConfig {
    fn default() -> Self {
        Self {
            styling_ms: default_styling_interval_ms(),
            outline_ms: default_outline_interval_ms(),
            status_ms: default_status_interval_ms(),
            gutter_ms: default_gutter_interval_ms(),
        }
    }
}

/// Result cache capacities, independent per artifact category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_styling_entries")]
    pub styling_entries: usize,

    #[serde(default = "default_outline_entries")]
    pub outline_entries: usize,

    #[serde(default = "default_counter_entries")]
    pub counter_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            styling_entries: default_styling_entries(),
            outline_entries: default_outline_entries(),
            counter_entries: default_counter_entries(),
        }
    }
}

/// Viewport tracking parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Lines of safety buffer above and below the visible range
    #[serde(default = "default_margin_lines")]
    pub margin_lines: usize,

    /// A scroll counts as significant only past this fraction of the
    /// window's own height
    #[serde(default = "default_significance_ratio")]
    pub significance_ratio: f64,

    /// Lower bound on the significance threshold, in lines
    #[serde(default = "default_significance_min_lines")]
    pub significance_min_lines: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            margin_lines: default_margin_lines(),
            significance_ratio: default_significance_ratio(),
            significance_min_lines: default_significance_min_lines(),
        }
    }
}

/// Bounds for the adaptive delay control loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Seconds between analysis passes over the latency history
    #[serde(default = "default_analysis_interval_secs")]
    pub analysis_interval_secs: u64,

    /// Minimum samples in the recent window before adapting a category
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// How many of the newest samples the analysis considers
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Mean latency above this backs the category off
    #[serde(default = "default_slow_bound_ms")]
    pub slow_bound_ms: u64,

    /// Mean latency below this tightens the category. Kept well apart from
    /// `slow_bound_ms` so the loop cannot oscillate around one boundary.
    #[serde(default = "default_fast_bound_ms")]
    pub fast_bound_ms: u64,

    /// Ratio applied to the delay multiplier on a slow verdict
    #[serde(default = "default_backoff_ratio")]
    pub backoff_ratio: f64,

    /// Ratio applied to the delay multiplier on a fast verdict
    #[serde(default = "default_recovery_ratio")]
    pub recovery_ratio: f64,

    #[serde(default = "default_multiplier_floor")]
    pub multiplier_floor: f64,

    #[serde(default = "default_multiplier_ceiling")]
    pub multiplier_ceiling: f64,

    /// Ratio applied to the skip threshold on a slow verdict
    #[serde(default = "default_skip_ratio")]
    pub skip_ratio: f64,

    #[serde(default = "default_skip_ceiling")]
    pub skip_ceiling: f64,

    /// Rolling latency window size per size category
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            analysis_interval_secs: default_analysis_interval_secs(),
            min_samples: default_min_samples(),
            recent_window: default_recent_window(),
            slow_bound_ms: default_slow_bound_ms(),
            fast_bound_ms: default_fast_bound_ms(),
            backoff_ratio: default_backoff_ratio(),
            recovery_ratio: default_recovery_ratio(),
            multiplier_floor: default_multiplier_floor(),
            multiplier_ceiling: default_multiplier_ceiling(),
            skip_ratio: default_skip_ratio(),
            skip_ceiling: default_skip_ceiling(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Dispatcher behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Outline passes for huge documents are skipped entirely if re-triggered
    /// within this cooldown of the previous pass
    #[serde(default = "default_outline_cooldown_ms")]
    pub outline_cooldown_ms: u64,

    /// A change report counts as localized if every changed line lies within
    /// this many lines of the cursor
    #[serde(default = "default_localized_window")]
    pub localized_window: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            outline_cooldown_ms: default_outline_cooldown_ms(),
            localized_window: default_localized_window(),
        }
    }
}

/// Which derived views the host supports. Absence of a capability is a
/// configuration choice, not a runtime probe: a kind whose feature is off is
/// dropped at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineFeatures {
    #[serde(default = "default_true")]
    pub outline: bool,

    #[serde(default = "default_true")]
    pub status_counters: bool,

    #[serde(default = "default_true")]
    pub line_gutter: bool,
}

impl Default for EngineFeatures {
    fn default() -> Self {
        Self {
            outline: true,
            status_counters: true,
            line_gutter: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_large_lines() -> usize {
    2000
}

fn default_huge_lines() -> usize {
    10_000
}

fn default_small_delay_ms() -> u64 {
    100
}

fn default_large_delay_ms() -> u64 {
    300
}

fn default_huge_delay_ms() -> u64 {
    1000
}

fn default_styling_multiplier() -> f64 {
    1.0
}

fn default_outline_multiplier() -> f64 {
    2.0
}

fn default_status_multiplier() -> f64 {
    0.5
}

fn default_gutter_multiplier() -> f64 {
    0.3
}

fn default_styling_interval_ms() -> u64 {
    200
}

fn default_outline_interval_ms() -> u64 {
    500
}

fn default_status_interval_ms() -> u64 {
    100
}

fn default_gutter_interval_ms() -> u64 {
    50
}

fn default_styling_entries() -> usize {
    10
}

fn default_outline_entries() -> usize {
    15
}

fn default_counter_entries() -> usize {
    20
}

fn default_margin_lines() -> usize {
    50
}

fn default_significance_ratio() -> f64 {
    0.1
}

fn default_significance_min_lines() -> usize {
    10
}

fn default_analysis_interval_secs() -> u64 {
    30
}

fn default_min_samples() -> usize {
    5
}

fn default_recent_window() -> usize {
    20
}

fn default_slow_bound_ms() -> u64 {
    500
}

fn default_fast_bound_ms() -> u64 {
    50
}

fn default_backoff_ratio() -> f64 {
    1.2
}

fn default_recovery_ratio() -> f64 {
    0.9
}

fn default_multiplier_floor() -> f64 {
    0.5
}

fn default_multiplier_ceiling() -> f64 {
    8.0
}

fn default_skip_ratio() -> f64 {
    1.1
}

fn default_skip_ceiling() -> f64 {
    2.0
}

fn default_history_capacity() -> usize {
    100
}

fn default_outline_cooldown_ms() -> u64 {
    2000
}

fn default_localized_window() -> usize {
    5
}
