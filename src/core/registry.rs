//! # Task registry - non-owning index of live tasks.
//!
//! Every task spawned (or attached) through the [`Runtime`](crate::Runtime) is
//! registered here under an explicit name at creation time. The shutdown
//! coordinator enumerates tasks by querying the registry instead of inspecting
//! scheduler internals.
//!
//! ## Architecture
//! ```text
//! Runtime::spawn(task) ──► Registry::register(name) ──► TaskHandle (strong, owned by the task)
//!                                     │
//!                                     └─► BTreeMap<TaskId, Weak>  (ordered by spawn sequence)
//!
//! Coordinator ──► Registry::list_running_except(caller, exclude) ──► Vec<TaskHandle> (snapshot)
//! ```
//!
//! ## Rules
//! - Registry never owns a task: entries are `Weak` and pruned once dead or terminated
//! - Names are unique among live entries
//! - Every query is computed fresh (no caching); snapshots are point-in-time
//! - Snapshot order is spawn order (`TaskId`)

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::handle::{TaskHandle, TaskId, WeakTaskHandle};
use super::request::ExclusionSet;
use crate::error::RuntimeError;

/// Index of registered tasks.
#[derive(Default)]
pub struct Registry {
    tasks: RwLock<BTreeMap<TaskId, WeakTaskHandle>>,
    next_id: AtomicU64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new task under `name` and returns its (only strong) handle.
    ///
    /// Fails with [`RuntimeError::DuplicateTask`] if a live task already uses the name.
    pub async fn register(&self, name: impl Into<Arc<str>>) -> Result<TaskHandle, RuntimeError> {
        let name: Arc<str> = name.into();
        let mut tasks = self.tasks.write().await;
        prune(&mut tasks);

        let taken = tasks
            .values()
            .filter_map(WeakTaskHandle::upgrade)
            .any(|h| h.name() == &*name);
        if taken {
            return Err(RuntimeError::DuplicateTask {
                name: name.to_string(),
            });
        }

        let id = TaskId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = TaskHandle::new(id, name);
        tasks.insert(id, handle.downgrade());
        Ok(handle)
    }

    /// Snapshot of every live task except `caller` and the names in `exclude`.
    pub async fn list_running_except(&self, caller: &str, exclude: &ExclusionSet) -> Vec<TaskHandle> {
        let mut tasks = self.tasks.write().await;
        prune(&mut tasks);

        tasks
            .values()
            .filter_map(WeakTaskHandle::upgrade)
            .filter(|h| h.name() != caller && !exclude.contains(h.name()))
            .collect()
    }

    /// Returns names of live tasks in spawn order.
    pub async fn list(&self) -> Vec<String> {
        let mut tasks = self.tasks.write().await;
        prune(&mut tasks);

        tasks
            .values()
            .filter_map(WeakTaskHandle::upgrade)
            .map(|h| h.name().to_string())
            .collect()
    }

    /// Number of live tasks.
    pub async fn len(&self) -> usize {
        self.list().await.len()
    }

    /// Returns true if no live task is registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Drops entries whose task is gone or terminated.
fn prune(tasks: &mut BTreeMap<TaskId, WeakTaskHandle>) {
    tasks.retain(|_, weak| weak.upgrade().is_some_and(|h| !h.is_terminated()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_snapshot_skips_caller_and_excluded() {
        let reg = Registry::new();
        let _main = reg.register("main").await.unwrap();
        let _a = reg.register("worker-1").await.unwrap();
        let _b = reg.register("worker-2").await.unwrap();
        let _c = reg.register("metrics").await.unwrap();

        let exclude = ExclusionSet::from_iter(["metrics"]);
        let names: Vec<_> = reg
            .list_running_except("main", &exclude)
            .await
            .iter()
            .map(|h| h.name().to_string())
            .collect();
        assert_eq!(names, ["worker-1", "worker-2"]);
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time() {
        let reg = Registry::new();
        let _a = reg.register("worker-1").await.unwrap();
        let snapshot = reg.list_running_except("main", &ExclusionSet::new()).await;

        let _b = reg.register("worker-2").await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(reg.list().await, ["worker-1", "worker-2"]);
    }

    #[tokio::test]
    async fn test_duplicate_live_name_rejected() {
        let reg = Registry::new();
        let first = reg.register("worker-1").await.unwrap();

        let err = reg.register("worker-1").await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_duplicate_task");

        first.terminate(Ok(()));
        assert!(reg.register("worker-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_registry_does_not_own_tasks() {
        let reg = Registry::new();
        let handle = reg.register("worker-1").await.unwrap();
        assert_eq!(reg.len().await, 1);

        drop(handle);
        assert!(reg.is_empty().await);
    }

    #[tokio::test]
    async fn test_terminated_tasks_are_not_listed() {
        let reg = Registry::new();
        let a = reg.register("worker-1").await.unwrap();
        let _b = reg.register("worker-2").await.unwrap();
        a.terminate(Ok(()));

        assert_eq!(reg.list().await, ["worker-2"]);
        assert_eq!(reg.list_running_except("main", &ExclusionSet::new()).await.len(), 1);
    }
}
