use std::sync::Arc;

use crate::{
    core::Config,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};
use super::supervisor::Supervisor;

/// Builder for constructing a [`Supervisor`] with optional subscribers.
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (worker liveness, shutdown progress, faults)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the Supervisor.
    ///
    /// Creates the event bus, spawns one worker per subscriber and an empty registry.
    /// Must be called inside a Tokio runtime.
    pub fn build(self) -> Supervisor {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        Supervisor::new_internal(self.cfg, bus, subs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_without_subscribers() {
        let sup = SupervisorBuilder::new(Config::default()).build();
        assert_eq!(sup.config().workers, 3);
        assert!(sup.runtime().registry().is_empty().await);
    }
}
