//! # Worker: long-lived task with a bounded cleanup phase.
//!
//! ## Loop
//! ```text
//! emit WorkerStarted
//! loop {
//!   ├─► emit WorkerAlive
//!   ├─► work.step()
//!   │      ├─ Err(Canceled) ──► cleanup (as below)
//!   │      └─ Err / panic ────► emit WorkerFault (swallowed, still Running)
//!   └─► suspend(interval)
//!          └─ cancelled ──► begin_cleanup (Running → Cancelling)
//!                           emit WorkerCleaning
//!                           sleep(cleanup)     (not interruptible)
//!                           work.cleanup() ─ Err ──► return Err (terminal fault)
//!                           emit WorkerCancelled
//!                           return Ok
//! }
//! ```
//!
//! ## Rules
//! - Work iterations start only in `Running`
//! - Step faults and step panics never end the worker; cleanup faults always do
//! - Cancellation observed inside a step is not a fault
//! - A repeated cancellation request during cleanup is ignored

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::time;

use crate::core::{Config, panic_info};
use crate::error::TaskError;
use crate::events::{Event, EventKind};
use crate::tasks::{Task, TaskContext, TaskRef};

/// The "work" a worker performs; pluggable collaborator.
///
/// Both hooks default to doing nothing.
#[async_trait]
pub trait Work: Send + Sync + 'static {
    /// One unit of steady-state work. Errors are reported and swallowed.
    async fn step(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    /// Teardown after the cleanup delay. Errors end the worker with a fault.
    async fn cleanup(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }
}

/// Work that does nothing but keep the loop going.
#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl Work for Idle {}

/// Long-lived worker task.
pub struct Worker {
    name: String,
    interval: Duration,
    cleanup: Duration,
    work: Arc<dyn Work>,
}

impl Worker {
    /// Creates an idle worker suspending for `interval` between iterations and
    /// spending `cleanup` on teardown.
    pub fn new(name: impl Into<String>, interval: Duration, cleanup: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
            cleanup,
            work: Arc::new(Idle),
        }
    }

    /// Creates an idle worker with intervals taken from `cfg`.
    pub fn from_config(name: impl Into<String>, cfg: &Config) -> Self {
        Self::new(name, cfg.interval, cfg.cleanup)
    }

    /// Replaces the work performed each iteration.
    #[must_use]
    pub fn with_work(mut self, work: impl Work) -> Self {
        self.work = Arc::new(work);
        self
    }

    pub fn arc(self) -> TaskRef {
        Arc::new(self)
    }

    fn report_fault(&self, ctx: &TaskContext, e: &TaskError) {
        ctx.publish(
            Event::new(EventKind::WorkerFault)
                .with_task(self.name.as_str())
                .with_reason(e.to_string()),
        );
    }

    async fn clean_up(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        ctx.begin_cleanup();
        ctx.emit(EventKind::WorkerCleaning);

        time::sleep(self.cleanup).await;
        self.work.cleanup(ctx).await?;

        ctx.emit(EventKind::WorkerCancelled);
        Ok(())
    }
}

#[async_trait]
impl Task for Worker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        ctx.emit(EventKind::WorkerStarted);

        loop {
            ctx.emit(EventKind::WorkerAlive);

            match AssertUnwindSafe(self.work.step(&ctx)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(TaskError::Canceled)) => return self.clean_up(&ctx).await,
                Ok(Err(e)) => self.report_fault(&ctx, &e),
                Err(payload) => self.report_fault(
                    &ctx,
                    &TaskError::Panicked {
                        info: panic_info(payload.as_ref()),
                    },
                ),
            }

            if ctx.suspend(self.interval).await.is_err() {
                return self.clean_up(&ctx).await;
            }
        }
    }
}
