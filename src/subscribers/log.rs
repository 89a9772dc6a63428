//! # LogWriter — structured event logger
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for demos or as a reference for writing your own subscriber.
//!
//! ## Example output
//! ```text
//!  INFO worker started job="ingest" worker=0
//!  WARN iteration failed job="ingest" worker=0 iteration=3 reason="connection refused"
//!  INFO drain requested active=2 grace_ms=5000
//!  INFO drained within grace grace_ms=5000
//! ERROR grace exceeded active=1 grace_ms=50
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event logger subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("unknown");
        match e.kind {
            EventKind::WorkerStarted => {
                tracing::info!(job, worker = e.worker, "worker started");
            }
            EventKind::WorkerExited => {
                tracing::info!(
                    job,
                    worker = e.worker,
                    iterations = e.iterations,
                    "worker exited"
                );
            }
            EventKind::IterationFailed => {
                tracing::warn!(
                    job,
                    worker = e.worker,
                    iteration = e.iterations,
                    reason = e.reason.as_deref(),
                    "iteration failed"
                );
            }
            EventKind::DrainRequested => {
                tracing::info!(active = e.active, grace_ms = e.grace_ms, "drain requested");
            }
            EventKind::DrainedWithin => {
                tracing::info!(grace_ms = e.grace_ms, "drained within grace");
            }
            EventKind::GraceExceeded => {
                tracing::error!(active = e.active, grace_ms = e.grace_ms, "grace exceeded");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    subscriber = job,
                    reason = e.reason.as_deref(),
                    "subscriber overflow"
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    subscriber = job,
                    info = e.reason.as_deref(),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
