//! Core trait definitions for generation storage and diagnostics.
//!
//! The engine never touches a concrete table type inside the recurrence: it
//! reads the previous generation and writes the current one through
//! [`GenerationTable`], which is what lets sparse and dense storage be swapped
//! per generation. Diagnostics flow out through [`GenerationObserver`].

use crate::observer::GenerationStats;
use crate::subset::DpKey;

/// Storage for one generation of DP results, keyed by packed [`DpKey`]s.
///
/// Semantics:
/// - A key that was never set, or was set to `+∞`, reads back as `+∞`.
/// - `len` counts the keys currently holding a finite cost.
/// - A key packed for a different city count is foreign: `set` ignores it
///   and `get` reads it as `+∞`.
/// - Implementations are free to choose their layout, but reading a key
///   must never fail: an unknown state is an unreachable state.
pub trait GenerationTable {
    /// Cost stored under `key`, or `f64::INFINITY` when absent.
    fn get(&self, key: DpKey) -> f64;

    /// Store `cost` under `key`, replacing any previous value. Foreign keys
    /// are ignored.
    fn set(&mut self, key: DpKey, cost: f64);

    /// Number of keys holding a finite cost.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate heap footprint in bytes, for diagnostics.
    fn heap_bytes(&self) -> usize;
}

/// Callback invoked by the engine once per completed generation.
///
/// Observers see statistics only; they cannot reach into the tables, so they
/// can never change the computed cost.
pub trait GenerationObserver {
    fn on_generation(&mut self, stats: &GenerationStats);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationStats),
{
    fn on_generation(&mut self, stats: &GenerationStats) {
        self(stats)
    }
}
