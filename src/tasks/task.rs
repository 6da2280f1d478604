//! # Task abstraction.
//!
//! This module defines the [`Task`] trait (async, cooperatively cancelable).
//! The common handle type is [`TaskRef`], an `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives a [`TaskContext`] and should suspend through
//! [`TaskContext::suspend`] so that it observes cancellation during shutdown.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::TaskContext;

/// # Shared handle to a task object.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cooperatively cancelable unit.
///
/// A `Task` has a stable [`name`](Task::name) (its registry identity) and an async
/// [`run`](Task::run) method that receives a [`TaskContext`].
///
/// # Example
/// ```
/// use std::time::Duration;
/// use async_trait::async_trait;
/// use shutdown_harness::{Task, TaskContext, TaskError};
///
/// struct Ticker;
///
/// #[async_trait]
/// impl Task for Ticker {
///     fn name(&self) -> &str { "ticker" }
///
///     async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
///         loop {
///             // do work...
///             if ctx.suspend(Duration::from_millis(250)).await.is_err() {
///                 return Ok(());
///             }
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task until completion or cancellation.
    ///
    /// Returning `Err(TaskError::Canceled)` counts as a clean exit; any other
    /// error becomes the task's terminal fault.
    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError>;
}
