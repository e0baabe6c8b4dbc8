//! Adaptive incremental highlighting and update-scheduling engine
//!
//! # Design
//! - **Differential updates**: per-line fingerprints detect exactly which lines
//!   changed, so a keystroke re-tokenizes O(1) lines instead of the buffer
//! - **Viewport-only styling**: huge documents are only styled inside the
//!   visible window, so editing a 20k-line file stays instant
//! - **Debounced scheduling**: bursts of edit/scroll events coalesce into a
//!   single pending pass per document, armed with a size-dependent delay
//! - **Adaptive tuning**: observed pass latencies feed a proportional control
//!   loop that backs delays off on slow machines and tightens them on fast ones
//!
//! The engine owns no rendering, file I/O, or widgets. The host editor
//! implements [`host::EditorHost`] (buffer reads, timers, paint callbacks) and
//! drives the engine from its event loop: call
//! [`Engine::request_update`](engine::Engine::request_update) on every edit or
//! scroll, and forward timer callbacks to
//! [`Engine::handle_timer`](engine::Engine::handle_timer).

pub mod adaptive;
pub mod cache;
pub mod change_tracker;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod fingerprint;
pub mod host;
pub mod outline;
pub mod scheduler;
pub mod status;
pub mod tokenizer;
pub mod viewport;

#[cfg(test)]
pub(crate) mod testing;

pub use adaptive::{EngineStatistics, SizeCategory};
pub use change_tracker::{ChangeReport, ChangeScope};
pub use config::EngineConfig;
pub use engine::Engine;
pub use host::{DocumentId, EditorHost, HostError, TimerId};
pub use outline::OutlineEntry;
pub use scheduler::{KindSet, UpdateKind};
pub use status::StatusCounters;
pub use tokenizer::{SpanCategory, StyleSpan};
pub use viewport::ViewportWindow;
