//! # Event subscribers for the pool runtime.
//!
//! This module provides the [`Subscribe`] trait and the fan-out machinery
//! for handling runtime events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   workers ── publish(Event) ──► Bus ──► WorkerPool listener
//!                                              │
//!                                              ▼
//!                                        SubscriberSet
//!                                    ┌────────┼────────┐
//!                                    ▼        ▼        ▼
//!                                LogWriter  Metrics  Custom ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use workgate::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::IterationFailed => {
//!                 // increment failure counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
