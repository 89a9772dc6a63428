//! # Admission gate: accept-new flag plus in-flight iteration count.
//!
//! [`Gate`] is the single piece of shared mutable state behind the pool's
//! lifecycle. Both fields live under one guard:
//!
//! - `accepting`: whether new iterations may start;
//! - `active`: how many iterations are currently executing.
//!
//! ## State machine
//! ```text
//! Accepting ──close()──► Draining ──(active hits 0)──► Idle
//!     │                      │
//!     │ try_admit() → true   │ try_admit() → false
//!     ▼                      ▼
//!  active += 1          workers exit their loops
//! ```
//!
//! ## Rules
//! - `try_admit` checks the flag and increments the count under one guard;
//!   an admitted iteration is always matched by exactly one `leave`.
//! - Once `close` flips the flag, the active count is monotonically
//!   non-increasing until it reaches zero.
//! - Reaching zero wakes every `wait_idle` caller; the wakeup is event-driven,
//!   there is no polling interval.

use std::sync::Mutex as StdMutex;

use tokio::sync::Notify;

struct GateState {
    accepting: bool,
    active: usize,
}

/// Shared admission state for one pool.
pub(crate) struct Gate {
    state: StdMutex<GateState>,
    idle: Notify,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self {
            state: StdMutex::new(GateState {
                accepting: true,
                active: 0,
            }),
            idle: Notify::new(),
        }
    }

    /// Admission check for one iteration.
    ///
    /// Returns `true` and counts the iteration as active when the gate is
    /// open; returns `false` once draining has begun.
    pub(crate) fn try_admit(&self) -> bool {
        let mut st = self.lock_state();
        if !st.accepting {
            return false;
        }
        st.active += 1;
        true
    }

    /// Marks one admitted iteration as finished.
    ///
    /// Wakes `wait_idle` callers when the count reaches zero.
    pub(crate) fn leave(&self) {
        let drained = {
            let mut st = self.lock_state();
            st.active = st.active.saturating_sub(1);
            st.active == 0
        };
        if drained {
            self.idle.notify_waiters();
        }
    }

    /// Stops admitting new iterations and returns the in-flight count at the
    /// moment the gate closed. Idempotent.
    pub(crate) fn close(&self) -> usize {
        let mut st = self.lock_state();
        st.accepting = false;
        st.active
    }

    /// Current in-flight iteration count.
    pub(crate) fn active(&self) -> usize {
        self.lock_state().active
    }

    /// Whether new iterations are still admitted.
    pub(crate) fn is_accepting(&self) -> bool {
        self.lock_state().accepting
    }

    /// Resolves once the active count is zero.
    ///
    /// Interest is registered before the count is read, so a `leave` landing
    /// between the check and the await cannot be missed.
    pub(crate) async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, GateState> {
        match self.state.lock() {
            Ok(st) => st,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_admit_denied_after_close() {
        let gate = Gate::new();
        assert!(gate.try_admit());
        assert_eq!(gate.close(), 1);
        assert!(!gate.try_admit());
        assert!(!gate.is_accepting());
        assert_eq!(gate.active(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let gate = Gate::new();
        gate.close();
        assert_eq!(gate.close(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_returns_immediately_when_idle() {
        let gate = Gate::new();
        tokio::time::timeout(Duration::from_millis(50), gate.wait_idle())
            .await
            .expect("idle gate must not wait");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_leave_wakes_idle_waiter() {
        let gate = Arc::new(Gate::new());
        assert!(gate.try_admit());
        gate.close();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        gate.leave();
        tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .expect("waiter woke after last leave")
            .expect("waiter task finished");
    }
}
