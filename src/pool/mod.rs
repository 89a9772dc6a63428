//! Worker pool: replicated job loops with drain-aware shutdown.
//!
//! This module contains the pool runtime. The public API surface:
//! - [`WorkerPool`] runs registered jobs and coordinates graceful drain;
//! - [`PoolBuilder`] constructs a pool with optional subscribers;
//! - [`PoolConfig`] centralizes runtime settings;
//! - [`Job`], [`JobFn`], [`JobRef`], [`JobSpec`] describe the work.
//!
//! Internal modules:
//! - [`gate`]: admission flag plus active-iteration count under one guard;
//! - [`worker`]: the per-worker loop with guaranteed active-count release.

mod builder;
mod config;
mod core;
mod gate;
mod job;
mod spec;
mod worker;

pub use builder::PoolBuilder;
pub use config::PoolConfig;
pub use core::WorkerPool;
pub use job::{Job, JobFn, JobRef};
pub use spec::JobSpec;
