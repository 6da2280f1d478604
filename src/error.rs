//! Error types used by the harness runtime and tasks.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: errors raised by the runtime itself (registration, signal binding, shutdown).
//! - [`TaskError`]: errors raised by individual task executions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Propagation
//! ```text
//! Worker step    ── TaskError::Fail     ──► reported, swallowed (worker keeps running)
//! suspend point  ── TaskError::Canceled ──► worker enters cleanup (never a failure)
//! cleanup phase  ── TaskError::Cleanup  ──► terminal fault ──► RuntimeError::CleanupFailed
//! task panic     ── TaskError::Panicked ──► terminal fault ──► RuntimeError::CleanupFailed
//! step panic     ── TaskError::Panicked ──► WorkerFault event, worker keeps Running
//!
//! entrypoint wait over all workers ── first terminal fault ──► RuntimeError::TaskFailed
//! ```

use thiserror::Error;

use crate::core::ShutdownSignal;

/// # Errors produced by the harness runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A task cancelled by a shutdown terminated with a fault.
    #[error(
        "shutdown on {} failed: task {task:?} terminated with: {error}",
        signal_label(.signal)
    )]
    CleanupFailed {
        /// Signal that triggered the shutdown (`None` when triggered directly by the entrypoint).
        signal: Option<ShutdownSignal>,
        /// Name of the first failed task (snapshot order).
        task: String,
        /// Terminal fault of that task.
        #[source]
        error: TaskError,
    },

    /// A task awaited by the entrypoint terminated with a fault.
    #[error("task {task:?} terminated with: {error}")]
    TaskFailed {
        /// Name of the first failed task (spawn order).
        task: String,
        /// Terminal fault of that task.
        #[source]
        error: TaskError,
    },

    /// A live task with the same name is already registered.
    #[error("task {name:?} is already registered")]
    DuplicateTask {
        /// Conflicting task name.
        name: String,
    },

    /// OS signal handler could not be installed.
    #[error("failed to install handler for {signal}: {source}")]
    SignalInstall {
        /// Signal being bound.
        signal: ShutdownSignal,
        /// Underlying I/O error from the signal driver.
        #[source]
        source: std::io::Error,
    },
}

fn signal_label(signal: &Option<ShutdownSignal>) -> &'static str {
    signal.map_or("direct request", ShutdownSignal::as_str)
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use shutdown_harness::RuntimeError;
    ///
    /// let err = RuntimeError::DuplicateTask { name: "worker-1".into() };
    /// assert_eq!(err.as_label(), "runtime_duplicate_task");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::CleanupFailed { .. } => "runtime_cleanup_failed",
            RuntimeError::TaskFailed { .. } => "runtime_task_failed",
            RuntimeError::DuplicateTask { .. } => "runtime_duplicate_task",
            RuntimeError::SignalInstall { .. } => "runtime_signal_install",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::CleanupFailed { task, error, .. } => {
                format!("task={task} failed during shutdown: {}", error.as_message())
            }
            RuntimeError::TaskFailed { task, error } => {
                format!("task={task} failed: {}", error.as_message())
            }
            RuntimeError::DuplicateTask { name } => format!("duplicate task name={name}"),
            RuntimeError::SignalInstall { signal, source } => {
                format!("cannot bind {signal}: {source}")
            }
        }
    }
}

/// # Errors produced by task execution.
///
/// Only [`TaskError::Cleanup`] and [`TaskError::Panicked`] are terminal faults.
/// A worker contains [`TaskError::Fail`] and panics raised by its step;
/// [`TaskError::Canceled`] is the cooperative stop request.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Steady-state work failed; the worker reports it and keeps iterating.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Cleanup after cancellation failed.
    #[error("cleanup failed: {error}")]
    Cleanup {
        /// The underlying error message.
        error: String,
    },

    /// Task body panicked.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Cancellation observed at a suspension point.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`TaskError::Cleanup`].
    pub fn cleanup(error: impl Into<String>) -> Self {
        TaskError::Cleanup {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use shutdown_harness::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Cleanup { .. } => "task_cleanup_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Cleanup { error } => format!("cleanup: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Indicates whether this error ends the task for good.
    ///
    /// Returns `true` for [`TaskError::Cleanup`] and [`TaskError::Panicked`].
    ///
    /// # Example
    /// ```
    /// use shutdown_harness::TaskError;
    ///
    /// assert!(!TaskError::fail("transient").is_terminal());
    /// assert!(TaskError::cleanup("disk gone").is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskError::Cleanup { .. } | TaskError::Panicked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_failed_keeps_source() {
        let err = RuntimeError::CleanupFailed {
            signal: Some(ShutdownSignal::Terminate),
            task: "worker-2".into(),
            error: TaskError::cleanup("flush"),
        };
        assert_eq!(err.as_label(), "runtime_cleanup_failed");
        assert_eq!(
            err.to_string(),
            "shutdown on SIGTERM failed: task \"worker-2\" terminated with: cleanup failed: flush"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("cleanup failed: flush"));
    }

    #[test]
    fn test_cleanup_failed_without_signal() {
        let err = RuntimeError::CleanupFailed {
            signal: None,
            task: "w".into(),
            error: TaskError::Canceled,
        };
        assert!(err.to_string().starts_with("shutdown on direct request failed"));
    }

    #[test]
    fn test_terminal_classification() {
        assert!(!TaskError::Canceled.is_terminal());
        assert!(TaskError::Panicked { info: "x".into() }.is_terminal());
        assert_eq!(TaskError::fail("boom").as_message(), "error: boom");
    }
}
