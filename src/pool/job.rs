//! # Job abstraction and function-backed job implementation.
//!
//! This module defines the [`Job`] trait (async, cancelable) and a convenient
//! function-backed implementation [`JobFn`]. The common handle type is
//! [`JobRef`], an `Arc<dyn Job>` suitable for sharing across workers.
//!
//! A job body is one **repeatable** unit of work: the pool invokes `run` in a
//! loop from every worker until draining begins. The body receives a
//! [`CancellationToken`] that is cancelled when drain starts; checking it is
//! cooperative — a body that ignores it simply finishes its current iteration
//! before the worker exits.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;

/// # One repeatable, cancelable unit of work.
///
/// A `Job` has a stable [`name`](Job::name) and an async [`run`](Job::run)
/// method invoked once per iteration. Returning `Err` marks the iteration
/// failed; the pool publishes the failure and moves on — it never retries
/// or interprets the error.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use workgate::{Job, JobError};
///
/// struct Poll;
///
/// #[async_trait]
/// impl Job for Poll {
///     fn name(&self) -> &str { "poll" }
///
///     async fn run(&self, ctx: CancellationToken) -> Result<(), JobError> {
///         if ctx.is_cancelled() {
///             return Err(JobError::Canceled);
///         }
///         // fetch a batch, process it...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable job name.
    fn name(&self) -> &str;

    /// Executes one iteration of the job.
    ///
    /// `ctx` is cancelled when the pool starts draining; long-running bodies
    /// should check it at convenient points and bail out with
    /// [`JobError::Canceled`].
    async fn run(&self, ctx: CancellationToken) -> Result<(), JobError>;
}

/// Function-backed job implementation.
///
/// Wraps a closure that *creates* a new future per iteration, so no state is
/// shared between iterations unless the closure captures an `Arc` explicitly.
#[derive(Debug)]
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle (`Arc<dyn Job>`).
    ///
    /// ## Example
    /// ```rust
    /// use tokio_util::sync::CancellationToken;
    /// use workgate::{JobFn, JobRef, JobError};
    ///
    /// let j: JobRef = JobFn::arc("tick", |_ctx: CancellationToken| async {
    ///     Ok::<_, JobError>(())
    /// });
    /// assert_eq!(j.name(), "tick");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Job for JobFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: std::future::Future<Output = Result<(), JobError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), JobError> {
        (self.f)(ctx).await
    }
}
