//! Runtime core: registry, shutdown coordination and the entrypoint.
//!
//! Internal modules:
//! - [`handle`]: task identity, lifecycle and the cancellation token;
//! - [`registry`]: process-wide map of live tasks;
//! - [`runtime`]: explicit handle that spawns and attaches tasks;
//! - [`runner`]: drives one task to termination with panic isolation;
//! - [`coordinator`]: cancels every running task and waits for all of them;
//! - [`listener`]: binds termination signals to the coordinator;
//! - [`supervisor`]: the entrypoint that starts workers and waits for them.

mod builder;
mod config;
mod coordinator;
mod handle;
mod listener;
mod registry;
mod request;
mod runner;
mod runtime;
mod signal;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::Config;
pub use coordinator::{COORDINATOR_IDENTITY, Coordinator, ShutdownReport};
pub use handle::{Lifecycle, TaskHandle, TaskId};
pub use listener::{Bindings, ShutdownOutcome, SignalHandler, SignalListener};
pub use registry::Registry;
pub use request::{ExclusionSet, ShutdownRequest};
pub use runtime::Runtime;
pub use signal::{ParseSignalError, ShutdownSignal};
pub use supervisor::Supervisor;

pub(crate) use runner::panic_info;
