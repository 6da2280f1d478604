//! # Broadcast bus shared by every harness component.
//!
//! ```text
//!   Worker 1..N ─┐
//!   Runtime     ─┤ publish(Event)               subscribe()
//!   Coordinator ─┼──────────────► [ ring buffer ] ──────────► Supervisor::subscriber_listener
//!   Listener    ─┘                                        └─► tests / ad-hoc receivers
//! ```
//!
//! ## Rules
//! - Publishing never waits; an event with no live receiver is dropped
//! - A receiver sees only events sent after it subscribed
//! - A receiver that falls more than `capacity` events behind gets `Lagged(n)`
//!   and resumes at the oldest retained event

use tokio::sync::broadcast;

use super::event::Event;

/// Handle to the event channel; clones publish into the same buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Bus retaining up to `capacity` unread events per receiver (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends `ev` to every current receiver.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Opens a receiver starting at the next published event.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn test_receiver_sees_only_later_events() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::WorkerAlive));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::WorkerCleaning).with_task("worker-1"));

        let ev = rx.recv().await.expect("event");
        assert_eq!(ev.kind, EventKind::WorkerCleaning);
        assert_eq!(ev.task.as_deref(), Some("worker-1"));
        assert!(rx.try_recv().is_err());
    }
}
