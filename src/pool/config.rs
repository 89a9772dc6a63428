//! # Pool configuration.
//!
//! Provides [`PoolConfig`] centralized settings for the worker pool.
//!
//! Config is used in two ways:
//! 1. **Pool creation**: `WorkerPool::new(config, subscribers)`
//! 2. **JobSpec defaults**: `JobSpec::with_defaults(job, &config)`
//!
//! ## Sentinel values
//! - `workers = 0` → treated as 1 (a job always gets at least one worker)
//! - `bus_capacity` below 1 → clamped to 1 by the `Bus`

use std::time::Duration;

/// Configuration for a worker pool instance.
///
/// ## Field semantics
/// - `grace`: drain window used by `run_until_signal` (explicit `shutdown`
///   calls pass their own grace)
/// - `workers`: default worker count for specs that do not set one
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum time `run_until_signal` waits for in-flight iterations to
    /// finish after a termination signal.
    pub grace: Duration,

    /// Default number of workers per job, used by
    /// [`JobSpec::with_defaults`](crate::JobSpec::with_defaults) and as the
    /// fallback when a spec carries the `0` sentinel.
    pub workers: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// the missed items.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Returns the default worker count with the `0` sentinel resolved.
    #[inline]
    pub fn workers_clamped(&self) -> usize {
        self.workers.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `grace = 60s` (reasonable graceful shutdown window)
    /// - `workers = 1`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(60),
            workers: 1,
            bus_capacity: 1024,
        }
    }
}
