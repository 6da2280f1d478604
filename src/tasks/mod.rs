//! # Task abstractions.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async cooperatively cancelable tasks
//! - [`TaskContext`] - runtime view given to a running task (suspension, events)
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`Worker`] - long-lived "work, suspend" loop with a cleanup phase

mod context;
mod task;
mod task_fn;
mod worker;

pub use context::TaskContext;
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
pub use worker::{Idle, Work, Worker};
