//! # Runtime handle: spawn, attach and enumerate tasks.
//!
//! [`Runtime`] is the explicit handle every component receives instead of a
//! process-wide singleton. It owns the [`Registry`] and the [`Bus`], and it is
//! the only way tasks enter the registry.
//!
//! ```text
//! Runtime::spawn(task)
//!   ├─► Registry::register(name)     → TaskHandle (Running)
//!   ├─► publish TaskRegistered
//!   └─► tokio::spawn(runner::drive)  → Task::run(ctx) → Terminated
//!
//! Runtime::attach(name)
//!   └─► Registry::register(name)     → TaskHandle driven by the caller itself
//! ```

use std::sync::Arc;

use super::{handle::TaskHandle, registry::Registry, runner};
use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    tasks::{TaskContext, TaskRef},
};

/// Cloneable handle to the task runtime.
#[derive(Clone)]
pub struct Runtime {
    registry: Arc<Registry>,
    bus: Bus,
}

impl Runtime {
    /// Creates a runtime publishing to `bus`.
    pub fn new(bus: Bus) -> Self {
        Self {
            registry: Arc::new(Registry::new()),
            bus,
        }
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registers `task` under its name and starts it on the current tokio runtime.
    pub async fn spawn(&self, task: TaskRef) -> Result<TaskHandle, RuntimeError> {
        let handle = self.register(task.name()).await?;
        let ctx = TaskContext::new(handle.clone(), self.bus.clone());
        tokio::spawn(runner::drive(task, ctx, self.bus.clone()));
        Ok(handle)
    }

    /// Registers the calling task itself under `name`.
    ///
    /// The returned handle is the task's identity; dropping it removes the task
    /// from enumeration.
    pub async fn attach(&self, name: &str) -> Result<TaskHandle, RuntimeError> {
        self.register(name).await
    }

    async fn register(&self, name: &str) -> Result<TaskHandle, RuntimeError> {
        let handle = self.registry.register(name).await?;
        self.bus
            .publish(Event::new(EventKind::TaskRegistered).with_task(handle.name_arc()));
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Lifecycle;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn test_spawned_task_terminates_and_leaves_registry() {
        let rt = Runtime::new(Bus::new(16));
        let h = rt
            .spawn(TaskFn::arc("once", |_ctx: TaskContext| async {
                Ok::<(), TaskError>(())
            }))
            .await
            .unwrap();

        assert_eq!(h.terminated().await, Ok(()));
        assert_eq!(h.lifecycle(), Lifecycle::Terminated);
        assert!(rt.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_panic_becomes_terminal_fault() {
        let rt = Runtime::new(Bus::new(16));
        let h = rt
            .spawn(TaskFn::arc("boom", |_ctx: TaskContext| async {
                if true {
                    panic!("exploded");
                }
                Ok::<(), TaskError>(())
            }))
            .await
            .unwrap();

        assert_eq!(
            h.terminated().await,
            Err(TaskError::Panicked {
                info: "exploded".into()
            })
        );
    }

    #[tokio::test]
    async fn test_canceled_return_is_clean_exit() {
        let rt = Runtime::new(Bus::new(16));
        let h = rt
            .spawn(TaskFn::arc("quitter", |_ctx: TaskContext| async {
                Err::<(), TaskError>(TaskError::Canceled)
            }))
            .await
            .unwrap();
        assert_eq!(h.terminated().await, Ok(()));
    }

    #[tokio::test]
    async fn test_attach_registers_without_spawning() {
        let rt = Runtime::new(Bus::new(16));
        let main = rt.attach("main").await.unwrap();
        assert_eq!(main.lifecycle(), Lifecycle::Running);
        assert_eq!(rt.registry().list().await, ["main"]);

        let err = rt.attach("main").await.unwrap_err();
        assert!(matches!(err, RuntimeError::DuplicateTask { .. }));
    }
}
