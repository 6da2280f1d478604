//! # Fan-out from the bus to [`Subscribe`] implementations.
//!
//! ```text
//! emit(&Event) ─ Arc<Event> ─┬─► queue(LogWriter) ─► pump ─► on_event()
//!                            └─► queue(custom)    ─► pump ─► on_event()
//!                                   │                  └─ panic ─► SubscriberPanicked
//!                                   └─ full / closed ─► event dropped here, SubscriberOverflow
//! ```
//!
//! A slow or broken subscriber only loses its own events. Each pump delivers in
//! bus order; pumps are not synchronised with each other.
//!
//! Panics are caught with `AssertUnwindSafe`: a subscriber that panics while
//! holding a lock on its own state may observe that state half-updated.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::core::panic_info;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

struct Queue {
    subscriber: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Bounded per-subscriber queues plus one pump task each.
pub struct SubscriberSet {
    queues: Vec<Queue>,
    pumps: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Starts one pump per subscriber. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (queues, pumps): (Vec<_>, Vec<_>) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let queue = Queue {
                    subscriber: sub.name(),
                    tx,
                };
                (queue, tokio::spawn(pump(sub, rx, bus.clone())))
            })
            .unzip();

        Self { queues, pumps, bus }
    }

    pub fn len(&self) -> usize {
        self.queues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }

    /// Queues `event` for every subscriber without waiting.
    ///
    /// A subscriber whose queue is full or closed misses the event and a
    /// `SubscriberOverflow` is published, unless the event is itself an overflow.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());

        for q in &self.queues {
            let cause = match q.tx.try_send(Arc::clone(&shared)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if shared.kind != EventKind::SubscriberOverflow {
                self.bus.publish(Event::subscriber_overflow(q.subscriber, cause));
            }
        }
    }

    /// Closes every queue and waits until each pump has delivered what was queued.
    pub async fn shutdown(self) {
        drop(self.queues);
        for pump in self.pumps {
            let _ = pump.await;
        }
    }
}

async fn pump(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_info(payload.as_ref()),
            ));
        }
    }
}
