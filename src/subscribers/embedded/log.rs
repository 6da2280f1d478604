//! # LogWriter: event renderer on top of `tracing`
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records. Where the
//! records go (stdout, JSON, files) is up to the installed `tracing` subscriber.
//!
//! ## Example output (`fmt` layer)
//! ```text
//! DEBUG worker started task="worker-1"
//! DEBUG worker alive task="worker-1"
//!  INFO shutdown requested signal=SIGTERM
//!  INFO currently running tasks signal=SIGTERM count=3
//!  INFO tasks cancelled signal=SIGTERM count=3
//!  INFO waiting for tasks to finish signal=SIGTERM
//! DEBUG worker cleaning task="worker-1"
//! DEBUG worker cancelled task="worker-1"
//!  INFO shutdown completed signal=SIGTERM remaining=0
//!  INFO main task finished task="main"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        let signal = e.signal.map_or("direct", |s| s.as_str());
        let count = e.count.unwrap_or(0);

        match e.kind {
            EventKind::TaskRegistered => debug!(task, "task registered"),
            EventKind::TaskTerminated if e.reason.is_some() => {
                error!(task, reason, "task terminated with fault")
            }
            EventKind::TaskTerminated => debug!(task, "task terminated"),
            EventKind::WorkerStarted => debug!(task, "worker started"),
            EventKind::WorkerAlive => debug!(task, "worker alive"),
            EventKind::WorkerFault => error!(task, reason, "worker step failed"),
            EventKind::WorkerCleaning => debug!(task, "worker cleaning"),
            EventKind::WorkerCancelled => debug!(task, "worker cancelled"),
            EventKind::SignalBound => info!(signal, "initialized handler for signal"),
            EventKind::ShutdownRequested => info!(signal, "shutdown requested"),
            EventKind::ShutdownSnapshot => info!(signal, count, "currently running tasks"),
            EventKind::TasksCancelled => info!(signal, count, "tasks cancelled"),
            EventKind::WaitingForTasks => info!(signal, "waiting for tasks to finish"),
            EventKind::ShutdownCompleted => info!(signal, remaining = count, "shutdown completed"),
            EventKind::ShutdownFailed => error!(signal, task, reason, "shutdown failed"),
            EventKind::EntrypointFinished if e.reason.is_some() => {
                error!(task, reason, "main task finished with fault")
            }
            EventKind::EntrypointFinished => info!(task, "main task finished"),
            EventKind::SubscriberOverflow => warn!(subscriber = task, reason, "subscriber overflow"),
            EventKind::SubscriberPanicked => error!(subscriber = task, reason, "subscriber panicked"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
