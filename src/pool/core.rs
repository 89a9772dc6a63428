//! # WorkerPool: replicated job loops behind one admission gate.
//!
//! The [`WorkerPool`] owns the event bus, a [`SubscriberSet`], and the
//! [`Gate`](super::gate) shared by every worker. It spawns `workers`
//! independent loops per registered [`JobSpec`] and coordinates a
//! timeout-bounded graceful drain.
//!
//! ## High-level architecture
//! ```text
//! Registration (before run):
//!   JobSpec { job A, workers: 3 }   JobSpec { job B, workers: 1 }
//!        │                               │
//! run(): ├──► worker A/0 ─┐              └──► worker B/0 ─┐
//!        ├──► worker A/1 ─┼── try_admit() ──► Gate { accepting, active }
//!        └──► worker A/2 ─┘                      ▲
//!                                                │
//! shutdown(grace): ── close() ───────────────────┘
//!        └─► drain token cancelled (cooperative, never a kill)
//!        └─► wait_idle() bounded by grace:
//!               ├─ idle in time  → Ok,  publish DrainedWithin
//!               └─ grace elapsed → Err(GraceExceeded), workers keep
//!                                  converging in the background
//!
//! Event flow:
//!   workers ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - Registration completes before `run()`; late registration is an error,
//!   never silently accepted.
//! - `run()` spawns and returns; it does not block or join.
//! - `shutdown` is idempotent: each call re-closes the gate (a no-op after
//!   the first) and re-waits with its own grace.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use workgate::{JobError, JobFn, JobRef, JobSpec, PoolConfig, WorkerPool};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = WorkerPool::new(PoolConfig::default(), vec![]);
//!
//!     let tick: JobRef = JobFn::arc("tick", |_ctx: CancellationToken| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Ok::<(), JobError>(())
//!     });
//!     pool.register(JobSpec::new(tick, 2))?;
//!
//!     pool.run()?;
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     pool.shutdown(Duration::from_secs(1)).await?;
//!     assert_eq!(pool.active(), 0);
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::PoolError;
use crate::events::{Bus, Event, EventKind};
use crate::pool::builder::PoolBuilder;
use crate::pool::config::PoolConfig;
use crate::pool::gate::Gate;
use crate::pool::spec::JobSpec;
use crate::pool::worker::run_worker;
use crate::signal;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Runs registered jobs across replicated workers and coordinates drain.
pub struct WorkerPool {
    cfg: PoolConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    gate: Arc<Gate>,
    drain: CancellationToken,
    jobs: StdMutex<Vec<JobSpec>>,
    started: AtomicBool,
}

impl WorkerPool {
    /// Creates a new pool with the given config and subscribers.
    pub fn new(cfg: PoolConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        Self {
            cfg,
            bus,
            subs,
            gate: Arc::new(Gate::new()),
            drain: CancellationToken::new(),
            jobs: StdMutex::new(Vec::new()),
            started: AtomicBool::new(false),
        }
    }

    /// Returns a builder for constructing a pool with optional pieces.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    /// Registers a job specification.
    ///
    /// Must be called before [`run`](Self::run); registration on a started
    /// pool returns [`PoolError::RegisterAfterStart`]. Registering
    /// concurrently with `run()` is unsupported.
    pub fn register(&self, spec: JobSpec) -> Result<(), PoolError> {
        if self.started.load(AtomicOrdering::Acquire) {
            return Err(PoolError::RegisterAfterStart {
                job: spec.name().to_string(),
            });
        }
        self.lock_jobs().push(spec);
        Ok(())
    }

    /// Spawns the configured workers for every registered job.
    ///
    /// Returns immediately; workers loop in the background until
    /// [`shutdown`](Self::shutdown) closes the gate. Calling `run` twice
    /// returns [`PoolError::AlreadyRunning`].
    pub fn run(&self) -> Result<(), PoolError> {
        if self.started.swap(true, AtomicOrdering::AcqRel) {
            return Err(PoolError::AlreadyRunning);
        }
        self.subscriber_listener();

        let specs = self.lock_jobs().clone();
        for spec in specs {
            let workers = match spec.workers() {
                0 => self.cfg.workers_clamped(),
                n => n,
            };
            for worker in 0..workers {
                tokio::spawn(run_worker(
                    Arc::clone(spec.job()),
                    worker as u32,
                    Arc::clone(&self.gate),
                    self.bus.clone(),
                    self.drain.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Drains the pool: closes the admission gate, cancels the drain token,
    /// and waits up to `grace` for in-flight iterations to finish.
    ///
    /// Returns `Ok(())` once the active count reaches zero within `grace`;
    /// otherwise [`PoolError::GraceExceeded`]. Either way no new iteration
    /// starts after this call — on timeout the workers keep converging in
    /// the background, and a later `shutdown` with a longer grace re-waits.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), PoolError> {
        let active = self.gate.close();
        self.drain.cancel();
        self.bus.publish(
            Event::now(EventKind::DrainRequested)
                .with_active(active)
                .with_grace(grace),
        );

        match time::timeout(grace, self.gate.wait_idle()).await {
            Ok(()) => {
                self.bus
                    .publish(Event::now(EventKind::DrainedWithin).with_grace(grace));
                Ok(())
            }
            Err(_elapsed) => {
                let active = self.gate.active();
                self.bus.publish(
                    Event::now(EventKind::GraceExceeded)
                        .with_active(active)
                        .with_grace(grace),
                );
                Err(PoolError::GraceExceeded { grace, active })
            }
        }
    }

    /// Runs the pool, blocks until the process receives a termination signal
    /// (SIGINT/SIGTERM, Ctrl-C on Windows), then drains with the configured
    /// [`PoolConfig::grace`].
    pub async fn run_until_signal(&self) -> Result<(), PoolError> {
        self.run()?;

        if let Err(e) = signal::wait_for_shutdown_signal().await {
            tracing::warn!(error = %e, "signal listener failed; draining immediately");
        }

        let begun = std::time::Instant::now();
        let res = self.shutdown(self.cfg.grace).await;
        let elapsed_ms = begun.elapsed().as_millis() as u64;
        match &res {
            Ok(()) => tracing::info!(elapsed_ms, "pool drained"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "pool drain exceeded grace"),
        }
        res
    }

    /// Number of iterations currently in flight.
    pub fn active(&self) -> usize {
        self.gate.active()
    }

    /// Whether the pool still admits new iterations.
    pub fn is_accepting(&self) -> bool {
        self.gate.is_accepting()
    }

    /// Creates a receiver observing subsequent runtime events.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let subs = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => subs.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn lock_jobs(&self) -> std::sync::MutexGuard<'_, Vec<JobSpec>> {
        match self.jobs.lock() {
            Ok(jobs) => jobs,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobError;
    use crate::pool::job::{JobFn, JobRef};
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    fn sleeper(name: &'static str, work: Duration) -> JobRef {
        JobFn::arc(name, move |_ctx: CancellationToken| async move {
            time::sleep(work).await;
            Ok(())
        })
    }

    fn counting(counter: Arc<AtomicU64>, work: Duration) -> JobRef {
        JobFn::arc("count", move |_ctx: CancellationToken| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                time::sleep(work).await;
                Ok(())
            }
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_workers_iterate_concurrently() {
        let gauge = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let job: JobRef = {
            let gauge = Arc::clone(&gauge);
            let peak = Arc::clone(&peak);
            JobFn::arc("gauge", move |_ctx: CancellationToken| {
                let gauge = Arc::clone(&gauge);
                let peak = Arc::clone(&peak);
                async move {
                    let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    time::sleep(Duration::from_millis(100)).await;
                    gauge.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };

        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(job, 3)).expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(250)).await;
        pool.shutdown(Duration::from_secs(2)).await.expect("drain");

        assert_eq!(peak.load(Ordering::SeqCst), 3, "3 workers must overlap");
        assert_eq!(pool.active(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_within_grace_succeeds() {
        let counter = Arc::new(AtomicU64::new(0));
        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(
            counting(Arc::clone(&counter), Duration::from_millis(10)),
            2,
        ))
        .expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(50)).await;
        pool.shutdown(Duration::from_secs(1)).await.expect("drain");

        assert_eq!(pool.active(), 0);
        assert!(!pool.is_accepting());
        assert!(counter.load(Ordering::SeqCst) > 0, "workers iterated");
    }

    #[tokio::test]
    async fn test_no_iteration_starts_after_drain() {
        let counter = Arc::new(AtomicU64::new(0));
        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(
            counting(Arc::clone(&counter), Duration::from_millis(10)),
            2,
        ))
        .expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(50)).await;
        pool.shutdown(Duration::from_secs(1)).await.expect("drain");

        let settled = counter.load(Ordering::SeqCst);
        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(
            counter.load(Ordering::SeqCst),
            settled,
            "no new iteration after drain"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_short_grace_times_out_then_redrain_succeeds() {
        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(
            sleeper("slow", Duration::from_millis(100)),
            3,
        ))
        .expect("register");
        pool.run().expect("run");
        time::sleep(Duration::from_millis(10)).await;

        let err = pool
            .shutdown(Duration::from_millis(50))
            .await
            .expect_err("grace shorter than in-flight work");
        match err {
            PoolError::GraceExceeded { active, .. } => {
                assert!((1..=3).contains(&active), "active={active}");
            }
            other => panic!("unexpected error: {other}"),
        }

        // Idempotent re-drain with a grace that covers the remaining work.
        pool.shutdown(Duration::from_millis(500))
            .await
            .expect("re-drain");
        assert_eq!(pool.active(), 0);
    }

    #[tokio::test]
    async fn test_cooperative_cancel_speeds_up_drain() {
        let job: JobRef = JobFn::arc("long", |ctx: CancellationToken| async move {
            tokio::select! {
                _ = ctx.cancelled() => Err(JobError::Canceled),
                _ = time::sleep(Duration::from_secs(30)) => Ok(()),
            }
        });

        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(job, 1)).expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(50)).await;
        pool.shutdown(Duration::from_millis(500))
            .await
            .expect("body observes the drain token");
        assert_eq!(pool.active(), 0);
    }

    #[tokio::test]
    async fn test_failed_iteration_published_and_loop_continues() {
        let counter = Arc::new(AtomicU64::new(0));
        let job: JobRef = {
            let counter = Arc::clone(&counter);
            JobFn::arc("flaky", move |_ctx: CancellationToken| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    time::sleep(Duration::from_millis(5)).await;
                    Err(JobError::Fail {
                        error: "boom".into(),
                    })
                }
            })
        };

        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        let mut rx = pool.events();
        pool.register(JobSpec::new(job, 1)).expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(60)).await;
        pool.shutdown(Duration::from_secs(1)).await.expect("drain");

        assert!(
            counter.load(Ordering::SeqCst) >= 2,
            "loop continues past failures"
        );

        let mut failures = 0;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::IterationFailed {
                failures += 1;
                assert_eq!(ev.job.as_deref(), Some("flaky"));
                assert_eq!(ev.reason.as_deref(), Some("iteration failed: boom"));
            }
        }
        assert!(failures >= 1, "failures reach the bus");
    }

    #[tokio::test]
    async fn test_register_after_run_is_rejected() {
        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(sleeper("a", Duration::from_millis(5)), 1))
            .expect("register");
        pool.run().expect("run");

        let err = pool
            .register(JobSpec::new(sleeper("late", Duration::from_millis(5)), 1))
            .expect_err("late registration");
        assert_eq!(err.as_label(), "pool_register_after_start");

        pool.shutdown(Duration::from_secs(1)).await.expect("drain");
    }

    #[tokio::test]
    async fn test_run_twice_is_rejected() {
        let pool = WorkerPool::new(PoolConfig::default(), vec![]);
        pool.register(JobSpec::new(sleeper("a", Duration::from_millis(5)), 1))
            .expect("register");
        pool.run().expect("first run");

        let err = pool.run().expect_err("second run");
        assert_eq!(err.as_label(), "pool_already_running");

        pool.shutdown(Duration::from_secs(1)).await.expect("drain");
    }

    #[tokio::test]
    async fn test_zero_worker_sentinel_uses_config_default() {
        let counter = Arc::new(AtomicU64::new(0));
        let cfg = PoolConfig {
            workers: 2,
            ..PoolConfig::default()
        };
        let pool = WorkerPool::new(cfg, vec![]);
        pool.register(JobSpec::new(
            counting(Arc::clone(&counter), Duration::from_millis(5)),
            0,
        ))
        .expect("register");
        pool.run().expect("run");

        time::sleep(Duration::from_millis(30)).await;
        pool.shutdown(Duration::from_secs(1)).await.expect("drain");
        assert!(counter.load(Ordering::SeqCst) > 0);
    }
}
