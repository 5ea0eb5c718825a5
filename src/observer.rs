//! Per-generation diagnostics.
//!
//! [`HeldKarp::run`](crate::HeldKarp::run) reports each generation boundary to
//! a [`GenerationObserver`]. Closures taking `&GenerationStats` are observers,
//! as is [`NoopObserver`], the default.

use std::time::Duration;

use crate::traits::GenerationObserver;

/// Snapshot taken right after the generation of subset size `size` was built,
/// before the previous generation is released.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationStats {
    /// Subset size of the generation just completed.
    pub size: usize,
    pub city_count: usize,
    /// Number of subsets of this size that contain city 0.
    pub subsets: u64,
    pub previous_entries: usize,
    pub current_entries: usize,
    pub previous_bytes: usize,
    pub current_bytes: usize,
    pub elapsed: Duration,
}

impl GenerationStats {
    /// Bytes held by both live generations.
    pub fn live_bytes(&self) -> usize {
        self.previous_bytes + self.current_bytes
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {
    #[inline]
    fn on_generation(&mut self, _stats: &GenerationStats) {}
}

/// Emits one `tracing` event per generation.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

#[cfg(feature = "tracing")]
impl GenerationObserver for TracingObserver {
    fn on_generation(&mut self, stats: &GenerationStats) {
        tracing::debug!(
            size = stats.size,
            city_count = stats.city_count,
            subsets = stats.subsets,
            previous_entries = stats.previous_entries,
            current_entries = stats.current_entries,
            previous_bytes = stats.previous_bytes,
            current_bytes = stats.current_bytes,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1e3,
            "generation complete"
        );
    }
}
