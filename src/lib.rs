//! # workgate
//!
//! **Workgate** is an in-process concurrency toolkit for async services built
//! on Tokio. It provides two independent primitives:
//!
//! - [`KeyedMutex`] — mutual exclusion scoped to a logical key, with idle
//!   keys' lock state reclaimed automatically;
//! - [`WorkerPool`] — replicated job loops behind a single admission gate,
//!   with timeout-bounded graceful drain.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   JobSpec    │   │   JobSpec    │   │   JobSpec    │
//!     │ (job A × 3)  │   │ (job B × 1)  │   │ (job C × 2)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  WorkerPool                                                   │
//! │  - Gate (admission flag + active-iteration count)             │
//! │  - Bus (broadcast events)                                     │
//! │  - SubscriberSet (fans out to user subscribers)               │
//! └──────┬──────────────────┬──────────────────┬──────────────────┘
//!        ▼                  ▼                  ▼
//!     worker A/0 ...     worker B/0         worker C/0 ...
//!        │                  │                  │
//!        │ loop:            │                  │
//!        │   admit? ── no ──┼── exit           │
//!        │   run body once  │                  │
//!        │   leave          │                  │
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                     │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                ▼
//!                          SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Drain lifecycle
//! ```text
//! shutdown(grace)
//!   ├─► gate.close()          no new iterations admitted
//!   ├─► drain token cancelled (cooperative; in-flight work may finish)
//!   └─► wait for active == 0, bounded by grace:
//!          ├─ Ok              → DrainedWithin
//!          └─ grace elapsed   → Err(GraceExceeded); workers keep
//!                               converging, a later shutdown re-waits
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                 |
//! |-------------------|--------------------------------------------------------------|------------------------------------|
//! | **Keyed locking** | Per-key exclusive locks with idle reclamation.               | [`KeyedMutex`], [`KeyedGuard`]     |
//! | **Worker pools**  | Replicated job loops with graceful drain.                    | [`WorkerPool`], [`JobSpec`]        |
//! | **Jobs**          | Define repeatable bodies as functions or trait impls.        | [`Job`], [`JobFn`], [`JobRef`]     |
//! | **Subscriber API**| Hook into pool lifecycle events (logging, metrics, custom).  | [`Subscribe`]                      |
//! | **Errors**        | Typed errors for the pool, job bodies, and bounded locking.  | [`PoolError`], [`JobError`], [`LockError`] |
//! | **Configuration** | Centralize runtime settings.                                 | [`PoolConfig`]                     |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use workgate::{JobError, JobFn, JobRef, JobSpec, KeyedMutex, PoolConfig, WorkerPool};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Per-key exclusion: contenders for the same account serialize,
//!     // different accounts proceed in parallel.
//!     let accounts: KeyedMutex<u64> = KeyedMutex::new();
//!     {
//!         let _guard = accounts.lock(42).await;
//!         // ...mutate account 42...
//!     }
//!     assert!(accounts.is_empty());
//!
//!     // A pool iterating one job body from two workers.
//!     let pool = WorkerPool::new(PoolConfig::default(), vec![]);
//!     let poll: JobRef = JobFn::arc("poll", |_ctx: CancellationToken| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Ok::<(), JobError>(())
//!     });
//!     pool.register(JobSpec::new(poll, 2))?;
//!     pool.run()?;
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     pool.shutdown(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod events;
mod keyed;
mod pool;
mod signal;
mod subscribers;

// ---- Public re-exports ----

pub use error::{JobError, LockError, PoolError};
pub use events::{Bus, Event, EventKind};
pub use keyed::{KeyedGuard, KeyedMutex};
pub use pool::{Job, JobFn, JobRef, JobSpec, PoolBuilder, PoolConfig, WorkerPool};
pub use signal::wait_for_shutdown_signal;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
