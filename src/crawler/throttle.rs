//! Politeness throttle
//!
//! Between iterations the engine sleeps a randomized interval drawn
//! uniformly from the configured `[low, high]` millisecond range, inclusive
//! at both ends. This and the blocking fetch are the only suspension points
//! in the engine.

use rand::Rng;
use std::time::Duration;

/// Draws a uniformly random interval from `[low_ms, high_ms]` inclusive
///
/// Callers must ensure `low_ms <= high_ms`; configuration validation
/// enforces this whenever throttling is enabled.
pub fn sample_interval(low_ms: u64, high_ms: u64) -> Duration {
    let millis = rand::thread_rng().gen_range(low_ms..=high_ms);
    Duration::from_millis(millis)
}
