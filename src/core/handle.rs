//! # Task handle and lifecycle state machine.
//!
//! ```text
//!            cancel() requested, observed at a suspension point
//!  Running ──────────────────────────────────────────────► Cancelling
//!     │                                                       │
//!     │ task body returns                    cleanup finishes │
//!     ▼                                                       ▼
//!  Terminated ◄───────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Lifecycle is written only from the task's own side (its context and the
//!   runtime wrapper that drives it); everyone else only reads it.
//! - `Cancelling` is entered at most once and never left for `Running`.
//! - `Terminated` is absorbing; the first recorded outcome wins.
//! - The cancellation flag is a [`CancellationToken`]: setting it twice is a no-op.

use std::fmt;
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Stable identity assigned at registration, increasing in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Observable lifecycle of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Performing work iterations.
    Running,
    /// Cancellation observed; cleanup in progress.
    Cancelling,
    /// Finished (cleanly or with a terminal fault).
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Running,
    Cancelling,
    Terminated(Result<(), TaskError>),
}

impl Status {
    fn lifecycle(&self) -> Lifecycle {
        match self {
            Status::Running => Lifecycle::Running,
            Status::Cancelling => Lifecycle::Cancelling,
            Status::Terminated(_) => Lifecycle::Terminated,
        }
    }
}

struct Inner {
    id: TaskId,
    name: Arc<str>,
    cancel: CancellationToken,
    status: watch::Sender<Status>,
}

/// Shared handle to a registered task.
///
/// Cloning is cheap. The registry keeps only a [`Weak`] reference, so a task
/// disappears from enumeration once every handle to it is gone.
#[derive(Clone)]
pub struct TaskHandle {
    inner: Arc<Inner>,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId, name: Arc<str>) -> Self {
        let (status, _rx) = watch::channel(Status::Running);
        Self {
            inner: Arc::new(Inner {
                id,
                name,
                cancel: CancellationToken::new(),
                status,
            }),
        }
    }

    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.inner.name)
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.status.borrow().lifecycle()
    }

    pub fn is_terminated(&self) -> bool {
        self.lifecycle() == Lifecycle::Terminated
    }

    /// Requests cooperative cancellation.
    ///
    /// Idempotent: a task that already has a pending request, is cleaning up,
    /// or has terminated is unaffected by another call.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Waits until the task reaches [`Lifecycle::Terminated`] and returns its outcome.
    ///
    /// `Err` carries the terminal fault (failed cleanup, panic).
    pub async fn terminated(&self) -> Result<(), TaskError> {
        let mut rx = self.inner.status.subscribe();
        match rx.wait_for(|s| matches!(s, Status::Terminated(_))).await {
            Ok(status) => match &*status {
                Status::Terminated(outcome) => outcome.clone(),
                _ => Ok(()),
            },
            // The sender lives in `inner`, which `self` keeps alive.
            Err(_) => Ok(()),
        }
    }

    pub(crate) fn token(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// `Running → Cancelling`. Returns `false` if the task was not running.
    pub(crate) fn begin_cleanup(&self) -> bool {
        self.inner.status.send_if_modified(|s| {
            if *s == Status::Running {
                *s = Status::Cancelling;
                true
            } else {
                false
            }
        })
    }

    /// Records the terminal outcome. Later calls are ignored.
    pub(crate) fn terminate(&self, outcome: Result<(), TaskError>) {
        self.inner.status.send_if_modified(|s| {
            if matches!(s, Status::Terminated(_)) {
                false
            } else {
                *s = Status::Terminated(outcome);
                true
            }
        });
    }

    pub(crate) fn downgrade(&self) -> WeakTaskHandle {
        WeakTaskHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("lifecycle", &self.lifecycle())
            .finish()
    }
}

/// Non-owning reference held by the registry.
#[derive(Clone)]
pub(crate) struct WeakTaskHandle {
    inner: Weak<Inner>,
}

impl WeakTaskHandle {
    pub(crate) fn upgrade(&self) -> Option<TaskHandle> {
        self.inner.upgrade().map(|inner| TaskHandle { inner })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(name: &str) -> TaskHandle {
        TaskHandle::new(TaskId(1), name.into())
    }

    #[test]
    fn test_cancelling_is_irreversible() {
        let h = handle("w");
        assert!(h.begin_cleanup());
        assert_eq!(h.lifecycle(), Lifecycle::Cancelling);
        assert!(!h.begin_cleanup());
        assert_eq!(h.lifecycle(), Lifecycle::Cancelling);
    }

    #[test]
    fn test_terminated_is_absorbing() {
        let h = handle("w");
        h.terminate(Err(TaskError::cleanup("first")));
        h.terminate(Ok(()));
        assert!(h.is_terminated());
        assert!(!h.begin_cleanup());
        assert_eq!(h.lifecycle(), Lifecycle::Terminated);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let h = handle("w");
        h.cancel();
        h.cancel();
        assert!(h.is_cancel_requested());
        assert_eq!(h.lifecycle(), Lifecycle::Running);
    }

    #[tokio::test]
    async fn test_terminated_returns_first_outcome() {
        let h = handle("w");
        let waiter = {
            let h = h.clone();
            tokio::spawn(async move { h.terminated().await })
        };
        tokio::task::yield_now().await;
        h.terminate(Err(TaskError::cleanup("flush")));
        h.terminate(Ok(()));

        let outcome = waiter.await.expect("join");
        assert_eq!(outcome, Err(TaskError::cleanup("flush")));
        assert_eq!(h.terminated().await, Err(TaskError::cleanup("flush")));
    }

    #[test]
    fn test_weak_does_not_keep_task_alive() {
        let h = handle("w");
        let weak = h.downgrade();
        assert!(weak.upgrade().is_some());
        drop(h);
        assert!(weak.upgrade().is_none());
    }
}
