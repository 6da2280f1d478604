//! # Runtime events emitted by the harness.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: a task was registered or reached its terminal state
//! - **Worker events**: steady-state and cleanup progress of a worker
//! - **Shutdown events**: progress of one coordinator invocation
//! - **Subscriber events**: delivery problems inside the fan-out
//!
//! An [`Event`] is a kind plus whichever of task, reason, signal and count
//! apply to it. `seq` is process-wide and strictly increasing, so events from
//! different publishers can be put back in emission order.
//!
//! ## Example
//! ```rust
//! use shutdown_harness::{Event, EventKind, ShutdownSignal};
//!
//! let ev = Event::new(EventKind::ShutdownSnapshot)
//!     .with_signal(ShutdownSignal::Terminate)
//!     .with_count(3);
//!
//! assert_eq!(ev.kind, EventKind::ShutdownSnapshot);
//! assert_eq!(ev.count, Some(3));
//! assert_eq!(ev.signal, Some(ShutdownSignal::Terminate));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::ShutdownSignal;

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // fan-out
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // registry
    /// Task was registered with the runtime (spawned or attached).
    ///
    /// Sets:
    /// - `task`: task name
    TaskRegistered,

    /// Task reached `Terminated`.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: terminal fault, if the task did not finish cleanly
    TaskTerminated,

    // worker
    /// Worker entered its loop.
    ///
    /// Sets:
    /// - `task`: worker name
    WorkerStarted,

    /// Worker begins a work iteration.
    ///
    /// Sets:
    /// - `task`: worker name
    WorkerAlive,

    /// Worker step failed; the worker keeps running.
    ///
    /// Sets:
    /// - `task`: worker name
    /// - `reason`: failure message
    WorkerFault,

    /// Worker observed cancellation and started cleanup.
    ///
    /// Sets:
    /// - `task`: worker name
    WorkerCleaning,

    /// Worker finished cleanup and leaves its loop.
    ///
    /// Sets:
    /// - `task`: worker name
    WorkerCancelled,

    // coordinator
    /// Handler installed for a signal.
    ///
    /// Sets:
    /// - `signal`: bound signal
    SignalBound,

    /// Shutdown started.
    ///
    /// Sets:
    /// - `signal`: triggering signal (absent for direct requests)
    ShutdownRequested,

    /// Registry snapshot taken.
    ///
    /// Sets:
    /// - `signal`: triggering signal
    /// - `count`: number of tasks selected for cancellation
    ShutdownSnapshot,

    /// Cancellation requested on every task of the snapshot.
    ///
    /// Sets:
    /// - `signal`: triggering signal
    /// - `count`: number of cancelled tasks
    TasksCancelled,

    /// Coordinator waits for cancelled tasks to terminate.
    ///
    /// Sets:
    /// - `signal`: triggering signal
    WaitingForTasks,

    /// Every cancelled task terminated cleanly.
    ///
    /// Sets:
    /// - `signal`: triggering signal
    /// - `count`: live tasks remaining outside the exclusion set
    ShutdownCompleted,

    /// A cancelled task terminated with a fault.
    ///
    /// Sets:
    /// - `signal`: triggering signal
    /// - `task`: first failed task
    /// - `reason`: terminal fault
    ShutdownFailed,

    // entrypoint
    /// Entrypoint's wait over all workers resolved.
    ///
    /// Sets:
    /// - `task`: entrypoint name
    /// - `reason`: propagated fault, if any
    EntrypointFinished,
}

/// One observable step of the harness. Optional fields per kind are listed on [`EventKind`].
#[derive(Clone, Debug)]
pub struct Event {
    /// Emission order across all publishers.
    pub seq: u64,
    /// Emission time.
    pub at: SystemTime,
    pub kind: EventKind,
    /// Task (or subscriber) the event is about.
    pub task: Option<Arc<str>>,
    /// Fault message or overflow cause.
    pub reason: Option<Arc<str>>,
    /// Signal that triggered a shutdown.
    pub signal: Option<ShutdownSignal>,
    /// Task count (snapshot size, cancelled, remaining).
    pub count: Option<u32>,
}

impl Event {
    /// Stamps a new event with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            signal: None,
            count: None,
        }
    }

    /// Sets `reason`.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets `task`.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the triggering signal, if any.
    #[inline]
    pub fn with_signal(mut self, signal: impl Into<Option<ShutdownSignal>>) -> Self {
        self.signal = signal.into();
        self
    }

    /// Attaches a task count (saturates at `u32::MAX`).
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(u32::try_from(n).unwrap_or(u32::MAX));
        self
    }

    /// `SubscriberOverflow` for `subscriber`; `reason` is "full" or "closed".
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// `SubscriberPanicked` carrying the rendered panic payload.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}
