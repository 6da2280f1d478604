//! # Drive one task body to its terminal state.
//!
//! Runs [`Task::run`] with panic isolation, then records the outcome on the
//! task's handle and publishes `TaskTerminated`.
//!
//! ## Outcome mapping
//! ```text
//! Ok(())                     → Terminated(Ok)
//! Err(TaskError::Canceled)   → Terminated(Ok)     (graceful exit)
//! Err(other)                 → Terminated(Err(other))
//! panic                      → Terminated(Err(Panicked))
//! ```
//!
//! ## Rules
//! - Always records **exactly one** terminal outcome per task
//! - The runner keeps the only long-lived strong handle until the task terminates

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    tasks::{TaskContext, TaskRef},
};

/// Runs `task` to completion and records the terminal outcome.
pub(crate) async fn drive(task: TaskRef, ctx: TaskContext, bus: Bus) {
    let handle = ctx.handle().clone();

    let outcome = match AssertUnwindSafe(task.run(ctx)).catch_unwind().await {
        Ok(Ok(())) | Ok(Err(TaskError::Canceled)) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(payload) => Err(TaskError::Panicked {
            info: panic_info(payload.as_ref()),
        }),
    };

    let mut ev = Event::new(EventKind::TaskTerminated).with_task(handle.name_arc());
    if let Err(e) = &outcome {
        ev = ev.with_reason(e.to_string());
    }
    bus.publish(ev);
    handle.terminate(outcome);
}

/// Renders a panic payload as text.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_info_variants() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_info(s.as_ref()), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_info(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_info(s.as_ref()), "unknown panic");
    }
}
