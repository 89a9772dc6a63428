//! Keyed mutual exclusion.
//!
//! This module provides [`KeyedMutex`], a registry that hands out a dedicated
//! exclusive lock per logical key and reclaims lock state once the last
//! interested caller is gone.
//!
//! ## Contents
//! - [`KeyedMutex`] the per-key lock registry
//! - [`KeyedGuard`] RAII guard; dropping it releases the key
//!
//! A leaf component: it does not touch the event bus, subscribers, or pool
//! configuration.

mod mutex;

pub use mutex::{KeyedGuard, KeyedMutex};
