//! # Worker loop: one concurrently scheduled iterator over a job body.
//!
//! Each worker runs the same loop:
//!
//! ```text
//! loop {
//!   ├─► admission check (gate open?) ── closed ──► exit loop, publish WorkerExited
//!   ├─► active count += 1 (same guard as the check)
//!   ├─► run one iteration of the job body
//!   │       ├─ Ok        → nothing to report
//!   │       ├─ Canceled  → cooperative drain exit, not a failure
//!   │       └─ Err       → publish IterationFailed (no retry)
//!   └─► active count -= 1 (RAII, every exit path)
//! }
//! ```
//!
//! ## Rules
//! - Iterations run **sequentially** within one worker (never parallel).
//! - The active-count decrement is tied to a guard dropped on **every** exit
//!   path — success, error, panic, or future drop — so the drain wait can
//!   never be left hanging by a misbehaving body.
//! - The body receives a child token per iteration; cancelling it on drain is
//!   a request, not a kill. A body that ignores it finishes normally.

use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use crate::error::JobError;
use crate::events::{Bus, Event, EventKind};
use crate::pool::gate::Gate;
use crate::pool::job::JobRef;

/// Occupancy of one admitted iteration.
///
/// Dropping the slot marks the iteration finished. Constructed only via
/// [`ActiveSlot::acquire`], which performs the admission check.
struct ActiveSlot<'a> {
    gate: &'a Gate,
}

impl<'a> ActiveSlot<'a> {
    /// Runs the admission check; `None` once the gate has closed.
    fn acquire(gate: &'a Gate) -> Option<Self> {
        if gate.try_admit() {
            Some(Self { gate })
        } else {
            None
        }
    }
}

impl Drop for ActiveSlot<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}

/// Runs one worker loop until the gate closes.
///
/// `worker` is the worker's index within its job (0-based), carried on every
/// event this loop publishes.
pub(crate) async fn run_worker(
    job: JobRef,
    worker: u32,
    gate: Arc<Gate>,
    bus: Bus,
    drain: CancellationToken,
) {
    bus.publish(
        Event::now(EventKind::WorkerStarted)
            .with_job(job.name())
            .with_worker(worker),
    );

    let mut iterations: u64 = 0;
    loop {
        let Some(slot) = ActiveSlot::acquire(&gate) else {
            break;
        };
        iterations += 1;

        let res = job.run(drain.child_token()).await;
        drop(slot);

        match res {
            Ok(()) => {}
            Err(JobError::Canceled) => {}
            Err(e) => {
                bus.publish(
                    Event::now(EventKind::IterationFailed)
                        .with_job(job.name())
                        .with_worker(worker)
                        .with_iterations(iterations)
                        .with_reason(e.to_string()),
                );
            }
        }
    }

    bus.publish(
        Event::now(EventKind::WorkerExited)
            .with_job(job.name())
            .with_worker(worker)
            .with_iterations(iterations),
    );
}
