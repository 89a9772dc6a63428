//! # Runtime events emitted by the worker pool.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Worker lifecycle**: a worker loop started or exited permanently
//! - **Iteration outcomes**: a job iteration failed
//! - **Drain progress**: drain requested, completed within grace, or grace exceeded
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job
//! name, worker index, and in-flight counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use workgate::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::IterationFailed)
//!     .with_job("ingest")
//!     .with_worker(2)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::IterationFailed);
//! assert_eq!(ev.job.as_deref(), Some("ingest"));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Worker lifecycle events ===
    /// A worker loop started.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `worker`: worker index within the job (0-based)
    WorkerStarted,

    /// A worker loop observed drain and exited permanently.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `worker`: worker index
    /// - `iterations`: iterations this worker completed over its lifetime
    WorkerExited,

    // === Iteration outcomes ===
    /// A job iteration returned an error.
    ///
    /// The pool does not retry or interpret the error; this event is the only
    /// trace it leaves.
    ///
    /// Sets:
    /// - `job`: job name
    /// - `worker`: worker index
    /// - `iterations`: 1-based iteration number within this worker
    /// - `reason`: failure message
    IterationFailed,

    // === Drain progress ===
    /// Drain requested; the admission gate is closed.
    ///
    /// Sets:
    /// - `active`: iterations in flight at the moment the gate closed
    /// - `grace_ms`: grace the caller is willing to wait (ms)
    DrainRequested,

    /// All in-flight iterations finished within the grace period.
    ///
    /// Sets:
    /// - `grace_ms`: the grace that was granted (ms)
    DrainedWithin,

    /// Grace period elapsed with iterations still in flight.
    ///
    /// Sets:
    /// - `active`: iterations still in flight
    /// - `grace_ms`: the grace that elapsed (ms)
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the job (or subscriber, for subscriber faults), if applicable.
    pub job: Option<Arc<str>>,
    /// Worker index within a job (0-based).
    pub worker: Option<u32>,
    /// Iteration count (meaning depends on `kind`, see variant docs).
    pub iterations: Option<u64>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Iterations in flight when the event was produced.
    pub active: Option<usize>,
    /// Drain grace in milliseconds (compact).
    pub grace_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            worker: None,
            iterations: None,
            reason: None,
            active: None,
            grace_ms: None,
        }
    }

    /// Attaches a job (or subscriber) name.
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches a worker index.
    #[inline]
    pub fn with_worker(mut self, worker: u32) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches an iteration count.
    #[inline]
    pub fn with_iterations(mut self, n: u64) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the number of in-flight iterations.
    #[inline]
    pub fn with_active(mut self, active: usize) -> Self {
        self.active = Some(active);
        self
    }

    /// Attaches a grace duration (stored as milliseconds).
    #[inline]
    pub fn with_grace(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.grace_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_job(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_job(subscriber)
            .with_reason(info)
    }
}
