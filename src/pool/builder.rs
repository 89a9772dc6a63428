use std::sync::Arc;

use crate::pool::config::PoolConfig;
use crate::pool::core::WorkerPool;
use crate::subscribers::Subscribe;

/// Builder for constructing a [`WorkerPool`] with optional pieces.
pub struct PoolBuilder {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (worker lifecycle, iteration
    /// failures, drain progress) through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds and returns the pool instance.
    pub fn build(self) -> Arc<WorkerPool> {
        Arc::new(WorkerPool::new(self.cfg, self.subscribers))
    }
}
