//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(TaskContext) -> Fut`, producing a fresh
//! future per run. Shared state, if any, goes into an explicit `Arc<...>`
//! captured by the closure.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use shutdown_harness::{TaskContext, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc("poller", |ctx: TaskContext| async move {
//!     while ctx.suspend(Duration::from_secs(1)).await.is_ok() {
//!         // poll...
//!     }
//!     Ok::<_, TaskError>(())
//! });
//!
//! assert_eq!(t.name(), "poller");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::{Task, TaskContext};

/// Function-backed task implementation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<(), TaskError> {
        (self.f)(ctx).await
    }
}
