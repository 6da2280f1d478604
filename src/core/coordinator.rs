//! # Shutdown coordinator: cancel everything not excluded, then wait.
//!
//! ## Protocol
//! ```text
//! shutdown(request)
//!   ├─► publish ShutdownRequested{signal}
//!   ├─► snapshot = Registry::list_running_except(identity, request.exclude)
//!   ├─► publish ShutdownSnapshot{count}
//!   ├─► for task in snapshot: task.cancel()        (all cancels before any wait)
//!   ├─► publish TasksCancelled{count}, WaitingForTasks
//!   ├─► join_all(task.terminated() for task in snapshot)
//!   │       ├─ any fault ─► publish ShutdownFailed ─► Err(CleanupFailed{first fault})
//!   │       └─ all clean ─► publish ShutdownCompleted{remaining}
//!   └─► Ok(ShutdownReport)
//! ```
//!
//! ## Rules
//! - Exclusions are exactly the request's set plus the coordinator's own identity
//! - No timeout: a task that never terminates blocks the coordinator
//! - Overlapping invocations are not serialized; a later one sees fewer tasks
//! - Tasks already `Cancelling` are still snapshotted and awaited, so every
//!   overlapping invocation that waited on a failing task reports its fault
//! - Every snapshot task is terminal before a fault is reported

use std::sync::Arc;

use futures::future::join_all;

use super::{
    handle::TaskHandle, request::ShutdownRequest, runtime::Runtime, signal::ShutdownSignal,
};
use crate::{
    error::RuntimeError,
    events::{Event, EventKind},
};

/// Identity used by coordinators spawned from signal handlers.
pub const COORDINATOR_IDENTITY: &str = "shutdown";

/// Outcome of a successful shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Signal that triggered the shutdown (`None` for direct requests).
    pub signal: Option<ShutdownSignal>,
    /// Names of the tasks this invocation cancelled, in snapshot order.
    pub cancelled: Vec<String>,
    /// Live tasks left outside the exclusion set after the wait.
    pub remaining: usize,
}

/// Runs the shutdown protocol against a [`Runtime`].
pub struct Coordinator {
    runtime: Runtime,
    identity: Arc<str>,
}

impl Coordinator {
    /// Coordinator acting as [`COORDINATOR_IDENTITY`].
    pub fn new(runtime: Runtime) -> Self {
        Self::with_identity(runtime, COORDINATOR_IDENTITY)
    }

    /// Coordinator acting on behalf of the task named `identity`.
    ///
    /// That task is never part of its own snapshot.
    pub fn with_identity(runtime: Runtime, identity: impl Into<Arc<str>>) -> Self {
        Self {
            runtime,
            identity: identity.into(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Cancels every live task outside the exclusion set and waits for all of them.
    pub async fn shutdown(&self, request: ShutdownRequest) -> Result<ShutdownReport, RuntimeError> {
        let signal = request.signal();
        let bus = self.runtime.bus();
        let registry = self.runtime.registry();

        bus.publish(Event::new(EventKind::ShutdownRequested).with_signal(signal));

        let targets = registry
            .list_running_except(&self.identity, request.exclude())
            .await;
        bus.publish(
            Event::new(EventKind::ShutdownSnapshot)
                .with_signal(signal)
                .with_count(targets.len()),
        );

        for task in &targets {
            task.cancel();
        }
        bus.publish(
            Event::new(EventKind::TasksCancelled)
                .with_signal(signal)
                .with_count(targets.len()),
        );

        bus.publish(Event::new(EventKind::WaitingForTasks).with_signal(signal));
        let outcomes = join_all(targets.iter().map(TaskHandle::terminated)).await;

        let failure = targets
            .iter()
            .zip(outcomes)
            .find_map(|(task, outcome)| outcome.err().map(|e| (task.name().to_string(), e)));
        if let Some((task, error)) = failure {
            bus.publish(
                Event::new(EventKind::ShutdownFailed)
                    .with_signal(signal)
                    .with_task(task.as_str())
                    .with_reason(error.to_string()),
            );
            return Err(RuntimeError::CleanupFailed {
                signal,
                task,
                error,
            });
        }

        let remaining = registry
            .list_running_except(&self.identity, request.exclude())
            .await
            .len();
        bus.publish(
            Event::new(EventKind::ShutdownCompleted)
                .with_signal(signal)
                .with_count(remaining),
        );

        Ok(ShutdownReport {
            signal,
            cancelled: targets.iter().map(|t| t.name().to_string()).collect(),
            remaining,
        })
    }
}
