//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the harness.
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::builder(config)`
//! 2. **Worker defaults**: `Worker::from_config(name, &config)`
//!
//! ## Sentinel values
//! - `workers = 0` → the entrypoint starts no workers and returns immediately
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use super::{request::ExclusionSet, signal::ShutdownSignal};

/// Global configuration for the harness.
///
/// ## Field semantics
/// - `workers`: number of workers the entrypoint starts (`worker-1..=worker-N`)
/// - `interval`: suspension between two work iterations
/// - `cleanup`: duration of a worker's cleanup phase (longer than `interval` by default)
/// - `entrypoint`: name the entrypoint registers under; always excluded from cancellation
/// - `signals`: termination signals bound to the coordinator
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of workers started by [`Supervisor::run`](crate::Supervisor::run).
    pub workers: usize,

    /// Pause between two work iterations of a worker.
    pub interval: Duration,

    /// Time a worker spends cleaning up after observing cancellation.
    ///
    /// There is no upper bound enforced by the coordinator.
    pub cleanup: Duration,

    /// Registry name of the entrypoint task.
    pub entrypoint: String,

    /// Signals that trigger a shutdown.
    pub signals: Vec<ShutdownSignal>,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Exclusion set installed with the signal bindings: the entrypoint itself.
    pub fn exclusion(&self) -> ExclusionSet {
        ExclusionSet::new().with(self.entrypoint.as_str())
    }

    /// Names of the workers started by the entrypoint.
    pub fn worker_names(&self) -> impl Iterator<Item = String> {
        (1..=self.workers).map(|n| format!("worker-{n}"))
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `workers = 3`
    /// - `interval = 1s`
    /// - `cleanup = 2s`
    /// - `entrypoint = "main"`
    /// - `signals = [SIGHUP, SIGINT, SIGTERM]`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            workers: 3,
            interval: Duration::from_secs(1),
            cleanup: Duration::from_secs(2),
            entrypoint: "main".to_string(),
            signals: ShutdownSignal::ALL.to_vec(),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_exclude_entrypoint() {
        let cfg = Config::default();
        assert!(cfg.cleanup > cfg.interval);
        assert!(cfg.exclusion().contains("main"));
        assert_eq!(cfg.exclusion().len(), 1);
    }

    #[test]
    fn test_worker_names() {
        let cfg = Config {
            workers: 2,
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.worker_names().collect::<Vec<_>>(), ["worker-1", "worker-2"]);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
