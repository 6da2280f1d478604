//! # Per-task execution context.
//!
//! [`TaskContext`] is what a running task sees of the runtime: its own handle,
//! the event bus, and the only suspension point that observes cancellation.
//!
//! ## Rules
//! - Cancellation is advisory: it is observed only inside [`TaskContext::suspend`].
//! - A pending request is seen immediately by the next `suspend` (biased check).
//! - Lifecycle writes made through the context are the task's own (single writer).

use std::time::Duration;

use tokio::time;

use crate::core::{Lifecycle, TaskHandle};
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

/// Runtime view handed to [`Task::run`](crate::Task::run).
#[derive(Clone)]
pub struct TaskContext {
    handle: TaskHandle,
    bus: Bus,
}

impl TaskContext {
    pub(crate) fn new(handle: TaskHandle, bus: Bus) -> Self {
        Self { handle, bus }
    }

    /// Registry name of this task.
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.handle.lifecycle()
    }

    /// True if cancellation has been requested (not yet necessarily observed).
    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancel_requested()
    }

    /// Suspends for `period`, yielding to the runtime.
    ///
    /// Returns `Err(TaskError::Canceled)` as soon as cancellation is pending.
    pub async fn suspend(&self, period: Duration) -> Result<(), TaskError> {
        let token = self.handle.token();
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(TaskError::Canceled),
            _ = time::sleep(period) => Ok(()),
        }
    }

    /// Moves this task from `Running` to `Cancelling`.
    ///
    /// Returns `false` if it was already past `Running`.
    pub fn begin_cleanup(&self) -> bool {
        self.handle.begin_cleanup()
    }

    /// Publishes `kind` tagged with this task's name.
    pub fn emit(&self, kind: EventKind) {
        self.bus.publish(Event::new(kind).with_task(self.handle.name_arc()));
    }

    /// Publishes an arbitrary event.
    pub fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Registry;

    async fn context(name: &str) -> (TaskContext, Bus) {
        let reg = Registry::new();
        let bus = Bus::new(16);
        let handle = reg.register(name).await.unwrap();
        (TaskContext::new(handle, bus.clone()), bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspend_completes_without_cancel() {
        let (ctx, _bus) = context("w").await;
        assert_eq!(ctx.suspend(Duration::from_secs(1)).await, Ok(()));
        assert_eq!(ctx.lifecycle(), Lifecycle::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_cancel_observed_at_next_suspend() {
        let (ctx, _bus) = context("w").await;
        ctx.handle().cancel();

        let started = time::Instant::now();
        assert_eq!(ctx.suspend(Duration::from_secs(60)).await, Err(TaskError::Canceled));
        assert_eq!(started.elapsed(), Duration::ZERO);
        // observing cancellation alone does not change lifecycle
        assert_eq!(ctx.lifecycle(), Lifecycle::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_suspension() {
        let (ctx, _bus) = context("w").await;
        let handle = ctx.handle().clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_millis(300)).await;
            handle.cancel();
        });

        let started = time::Instant::now();
        assert_eq!(ctx.suspend(Duration::from_secs(60)).await, Err(TaskError::Canceled));
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_emit_tags_task_name() {
        let (ctx, bus) = context("worker-7").await;
        let mut rx = bus.subscribe();
        ctx.emit(EventKind::WorkerAlive);

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerAlive);
        assert_eq!(ev.task.as_deref(), Some("worker-7"));
    }
}
