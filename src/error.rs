//! Error types used by the workgate pool and keyed locks.
//!
//! This module defines three error enums:
//!
//! - [`PoolError`] — errors raised by the worker-pool runtime itself.
//! - [`JobError`] — errors raised by individual job iterations.
//! - [`LockError`] — errors raised by bounded keyed-lock acquisition.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the worker-pool runtime.
///
/// These represent failures of the pool machinery itself, such as a drain
/// exceeding its grace period, never failures of job bodies.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PoolError {
    /// Drain grace period was exceeded; some iterations were still in flight.
    ///
    /// The pool stays in draining mode and keeps converging toward idle in the
    /// background; calling [`shutdown`](crate::WorkerPool::shutdown) again with
    /// a longer grace re-waits.
    #[error("drain grace {grace:?} exceeded; {active} iteration(s) still in flight")]
    GraceExceeded {
        /// The grace duration that elapsed.
        grace: Duration,
        /// Number of iterations still active at the moment the wait gave up.
        active: usize,
    },

    /// `run()` was called on a pool that is already running.
    #[error("pool is already running")]
    AlreadyRunning,

    /// A job was registered after `run()` had started.
    ///
    /// Registration must complete before the pool is started; this is a
    /// contract violation by the caller, reported explicitly rather than
    /// panicking.
    #[error("job '{job}' registered after the pool started")]
    RegisterAfterStart {
        /// Name of the rejected job.
        job: String,
    },
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workgate::PoolError;
    /// use std::time::Duration;
    ///
    /// let err = PoolError::GraceExceeded { grace: Duration::from_secs(5), active: 2 };
    /// assert_eq!(err.as_label(), "pool_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::GraceExceeded { .. } => "pool_grace_exceeded",
            PoolError::AlreadyRunning => "pool_already_running",
            PoolError::RegisterAfterStart { .. } => "pool_register_after_start",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::GraceExceeded { grace, active } => {
                format!("grace exceeded after {grace:?}; active={active}")
            }
            PoolError::AlreadyRunning => "already running".to_string(),
            PoolError::RegisterAfterStart { job } => {
                format!("register after start: job={job}")
            }
        }
    }
}

/// # Errors produced by job iterations.
///
/// The pool treats these as opaque outcomes: an `Err` iteration is published
/// to the bus and logged, never retried or interpreted. Distinguishing
/// recoverable from fatal conditions is the job body's own business.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JobError {
    /// Iteration failed with an application-level error.
    #[error("iteration failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Iteration observed drain and exited early.
    #[error("drain observed, iteration canceled")]
    Canceled,
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workgate::JobError;
    ///
    /// let err = JobError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "job_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Canceled => "job_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Canceled => "canceled".to_string(),
        }
    }

    /// True when the iteration exited because drain was observed.
    pub fn is_canceled(&self) -> bool {
        matches!(self, JobError::Canceled)
    }
}

/// # Errors produced by bounded keyed-lock acquisition.
///
/// Only the timeout-capable variants can fail; plain
/// [`lock`](crate::KeyedMutex::lock) blocks until acquired.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LockError {
    /// The per-key lock was not acquired within the allotted wait.
    #[error("lock not acquired within {timeout:?}")]
    AcquireTimeout {
        /// The wait that elapsed.
        timeout: Duration,
    },
}

impl LockError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LockError::AcquireTimeout { .. } => "lock_acquire_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LockError::AcquireTimeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }
}
