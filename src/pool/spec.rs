//! # Job specification for pooled execution.
//!
//! Defines [`JobSpec`] a configuration bundle pairing a job body with the
//! number of workers that loop over it concurrently.
//!
//! A spec can be created:
//! - **Explicitly** with [`JobSpec::new`] (full control)
//! - **From config** with [`JobSpec::with_defaults`] (inherit the default
//!   worker count)
//!
//! ## Rules
//! - Specs are registered with [`WorkerPool::register`](crate::WorkerPool::register)
//!   before the pool is started.

use crate::pool::config::PoolConfig;
use crate::pool::job::JobRef;

/// Specification for running a job inside a pool.
///
/// Bundles together:
/// - The job itself ([`JobRef`])
/// - The worker count (how many loops iterate the body concurrently)
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use workgate::{JobSpec, JobFn, JobRef, JobError, PoolConfig};
///
/// let consume: JobRef = JobFn::arc("consume", |_ctx: CancellationToken| async move {
///     Ok::<(), JobError>(())
/// });
///
/// // Explicit worker count:
/// let spec = JobSpec::new(consume.clone(), 4);
/// assert_eq!(spec.workers(), 4);
///
/// // Inherit from config:
/// let cfg = PoolConfig::default();
/// let spec2 = JobSpec::with_defaults(consume, &cfg);
/// assert_eq!(spec2.workers(), 1);
/// ```
#[derive(Clone)]
pub struct JobSpec {
    job: JobRef,
    workers: usize,
}

impl JobSpec {
    /// Creates a new job specification with an explicit worker count.
    ///
    /// A count of `0` is a sentinel resolved to the pool's configured default
    /// when the pool starts.
    pub fn new(job: JobRef, workers: usize) -> Self {
        Self { job, workers }
    }

    /// Creates a job specification inheriting the worker count from config.
    pub fn with_defaults(job: JobRef, cfg: &PoolConfig) -> Self {
        Self {
            job,
            workers: cfg.workers_clamped(),
        }
    }

    /// Returns a reference to the job.
    pub fn job(&self) -> &JobRef {
        &self.job
    }

    /// Convenience: returns the job name.
    pub fn name(&self) -> &str {
        self.job.name()
    }

    /// Returns the worker count as registered (the `0` sentinel unresolved).
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Returns a new spec with an updated worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}
