//! # shutdown-harness
//!
//! **shutdown-harness** runs a set of long-lived async workers and takes them
//! down in an orderly way when the process receives a termination signal.
//!
//! Every task lives in a shared [`Registry`]. A termination signal is routed to
//! the shutdown [`Coordinator`], which cancels every running task except the
//! requester and its exclusions, then waits until all of them have finished
//! their cleanup phase. The entrypoint returns once its workers are gone.
//!
//! ## Architecture
//! ```text
//!   SIGHUP / SIGINT / SIGTERM
//!              │
//!              ▼
//!     ┌──────────────────┐   fire()   ┌───────────────────────────────────────┐
//!     │  SignalListener  │ ─────────► │  Coordinator::shutdown(request)       │
//!     │ (one handler per │            │  1. snapshot Running, minus exclusions│
//!     │      signal)     │            │  2. cancel every target               │
//!     └──────────────────┘            │  3. wait for all targets to terminate │
//!                                     └───────────────┬───────────────────────┘
//!                                                     │ cancel()
//!     ┌──────────────────────────────────────────────┐▼
//!     │  Registry (name → TaskHandle)                │
//!     │   main      worker-1    worker-2    worker-3 │
//!     └───┬──────────┬───────────┬───────────┬───────┘
//!         │          ▼           ▼           ▼
//!         │      Worker::run: alive ─► step ─► suspend(interval)
//!         │                      cancelled ─► cleanup(delay) ─► Terminated
//!         ▼
//!     Supervisor (entrypoint, excluded) ── waits for all workers ──► run() returns
//!
//!     every component ── publish(Event) ──► Bus ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ## Lifecycle
//! ```text
//! Running ──cancel observed──► Cancelling ──cleanup done──► Terminated
//!    └──────────── task returned / panicked ──────────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                       |
//! |-------------------|-----------------------------------------------------------|------------------------------------------|
//! | **Tasks**         | Cooperatively cancellable units with one suspension point | [`Task`], [`TaskContext`], [`TaskFn`]    |
//! | **Workers**       | Work/suspend loop with a bounded cleanup phase            | [`Worker`], [`Work`]                     |
//! | **Registry**      | Process-wide view of live tasks                           | [`Registry`], [`TaskHandle`]             |
//! | **Shutdown**      | Cancel-all-then-wait coordination                         | [`Coordinator`], [`ShutdownRequest`]     |
//! | **Signals**       | Termination signals bound to the coordinator              | [`SignalListener`], [`Bindings`]         |
//! | **Subscriber API**| Hook into runtime events                                  | [`Subscribe`]                            |
//! | **Errors**        | Typed errors for tasks and orchestration                  | [`TaskError`], [`RuntimeError`]          |
//! | **Configuration** | Worker count, intervals, signal set                       | [`Config`]                               |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shutdown_harness::{Config, Subscribe, Supervisor, TaskContext, TaskError, TaskFn, TaskRef, Worker};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.cleanup = Duration::from_secs(5);
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     let sup = Supervisor::builder(cfg).with_subscribers(subs).build();
//!
//!     let poller: TaskRef = TaskFn::arc("poller", |ctx: TaskContext| async move {
//!         // one unit of work per tick until cancellation is observed
//!         while ctx.suspend(Duration::from_millis(250)).await.is_ok() {}
//!         Ok::<(), TaskError>(())
//!     });
//!     let worker = Worker::from_config("worker-1", sup.config()).arc();
//!
//!     sup.run_with(vec![poller, worker]).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use self::core::{
    Bindings, COORDINATOR_IDENTITY, Config, Coordinator, ExclusionSet, Lifecycle,
    ParseSignalError, Registry, Runtime, ShutdownOutcome, ShutdownReport, ShutdownRequest,
    ShutdownSignal, SignalHandler, SignalListener, Supervisor, SupervisorBuilder, TaskHandle,
    TaskId,
};
pub use error::{RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{Idle, Task, TaskContext, TaskFn, TaskRef, Work, Worker};

// Built-in logger subscriber.
// Disable with: `--no-default-features`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
