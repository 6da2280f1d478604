//! # Signal listener: bind OS termination signals to the coordinator.
//!
//! ```text
//! bind([SIGHUP, SIGINT, SIGTERM])
//!   for each signal:
//!     handler = SignalHandler { signal (by value), exclude, coordinator }
//!     tokio::spawn(loop { stream.recv() ─► handler.fire() })
//!
//! handler.fire()
//!   └─► tokio::spawn(coordinator.shutdown(ShutdownRequest{signal, exclude}))
//!           └─► report ─► Bindings::next_report()
//! ```
//!
//! ## Rules
//! - Each handler owns its signal value; handlers never share a mutable slot
//! - Delivery never blocks: every fire spawns an independent coordinator run
//! - Repeated deliveries start overlapping shutdowns (best effort, no locking)
//! - Dropping [`Bindings`] stops listening; in-flight shutdowns keep running

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{
    coordinator::{Coordinator, ShutdownReport},
    request::{ExclusionSet, ShutdownRequest},
    signal::ShutdownSignal,
};
use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
};

/// Result of one coordinator run started by a signal.
pub type ShutdownOutcome = Result<ShutdownReport, RuntimeError>;

/// Handler bound to exactly one signal.
#[derive(Clone)]
pub struct SignalHandler {
    signal: ShutdownSignal,
    exclude: ExclusionSet,
    coordinator: Arc<Coordinator>,
    reports: mpsc::UnboundedSender<ShutdownOutcome>,
}

impl SignalHandler {
    pub fn signal(&self) -> ShutdownSignal {
        self.signal
    }

    /// Schedules a coordinator run for this handler's signal as a separate task.
    pub fn fire(&self) -> JoinHandle<()> {
        let coordinator = Arc::clone(&self.coordinator);
        let request = ShutdownRequest::new(self.signal, self.exclude.clone());
        let reports = self.reports.clone();

        tokio::spawn(async move {
            let outcome = coordinator.shutdown(request).await;
            let _ = reports.send(outcome);
        })
    }
}

/// Builds per-signal handlers sharing one coordinator and exclusion set.
pub struct SignalListener {
    coordinator: Arc<Coordinator>,
    exclude: ExclusionSet,
    bus: Bus,
    tx: mpsc::UnboundedSender<ShutdownOutcome>,
    rx: mpsc::UnboundedReceiver<ShutdownOutcome>,
}

impl SignalListener {
    pub fn new(coordinator: Arc<Coordinator>, exclude: ExclusionSet, bus: Bus) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            exclude,
            bus,
            tx,
            rx,
        }
    }

    /// Handler for `signal`, capturing it by value.
    pub fn handler(&self, signal: ShutdownSignal) -> SignalHandler {
        SignalHandler {
            signal,
            exclude: self.exclude.clone(),
            coordinator: Arc::clone(&self.coordinator),
            reports: self.tx.clone(),
        }
    }

    /// Installs an OS handler for every signal in `signals`.
    ///
    /// On non-unix platforms only [`ShutdownSignal::Interrupt`] is bound (Ctrl-C);
    /// the other signals are skipped.
    pub fn bind(self, signals: &[ShutdownSignal]) -> Result<Bindings, RuntimeError> {
        let mut handlers = Vec::with_capacity(signals.len());
        let mut listeners = Vec::with_capacity(signals.len());

        for &signal in signals {
            if handlers.iter().any(|h: &SignalHandler| h.signal == signal) {
                continue;
            }
            let handler = self.handler(signal);
            let Some(listener) = install(handler.clone())? else {
                continue;
            };
            self.bus
                .publish(Event::new(EventKind::SignalBound).with_signal(signal));
            handlers.push(handler);
            listeners.push(listener);
        }

        Ok(Bindings {
            handlers,
            listeners,
            reports: self.rx,
        })
    }
}

#[cfg(unix)]
fn install(handler: SignalHandler) -> Result<Option<JoinHandle<()>>, RuntimeError> {
    use tokio::signal::unix::signal;

    let mut stream = signal(handler.signal.kind()).map_err(|source| RuntimeError::SignalInstall {
        signal: handler.signal,
        source,
    })?;

    Ok(Some(tokio::spawn(async move {
        while stream.recv().await.is_some() {
            handler.fire();
        }
    })))
}

#[cfg(not(unix))]
fn install(handler: SignalHandler) -> Result<Option<JoinHandle<()>>, RuntimeError> {
    if handler.signal != ShutdownSignal::Interrupt {
        return Ok(None);
    }
    Ok(Some(tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            handler.fire();
        }
    })))
}

/// Installed signal bindings.
pub struct Bindings {
    handlers: Vec<SignalHandler>,
    listeners: Vec<JoinHandle<()>>,
    reports: mpsc::UnboundedReceiver<ShutdownOutcome>,
}

impl Bindings {
    /// Signals that are actually bound.
    pub fn signals(&self) -> Vec<ShutdownSignal> {
        self.handlers.iter().map(SignalHandler::signal).collect()
    }

    /// Runs the bound handler for `signal` as if the OS had delivered it.
    ///
    /// Returns `None` if `signal` is not bound.
    pub fn deliver(&self, signal: ShutdownSignal) -> Option<JoinHandle<()>> {
        self.handlers
            .iter()
            .find(|h| h.signal == signal)
            .map(SignalHandler::fire)
    }

    /// Waits for the next finished coordinator run.
    pub async fn next_report(&mut self) -> Option<ShutdownOutcome> {
        self.reports.recv().await
    }

    /// Returns an already finished coordinator run, if any.
    pub fn try_report(&mut self) -> Option<ShutdownOutcome> {
        self.reports.try_recv().ok()
    }
}

impl Drop for Bindings {
    fn drop(&mut self) {
        for listener in &self.listeners {
            listener.abort();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use tokio::time;

    use super::*;
    use crate::core::{Lifecycle, Runtime};
    use crate::tasks::Worker;

    async fn setup(workers: usize) -> (Runtime, Bindings) {
        let rt = Runtime::new(Bus::new(256));
        for i in 1..=workers {
            let w = Worker::new(format!("worker-{i}"), Duration::from_secs(1), Duration::from_secs(2));
            rt.spawn(w.arc()).await.unwrap();
        }
        let coordinator = Arc::new(Coordinator::new(rt.clone()));
        let listener = SignalListener::new(
            coordinator,
            ExclusionSet::from_iter(["main"]),
            rt.bus().clone(),
        );
        let bindings = listener.bind(&ShutdownSignal::ALL).unwrap();
        (rt, bindings)
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_binding_carries_its_own_signal() {
        let (_rt, mut bindings) = setup(0).await;
        assert_eq!(bindings.signals(), ShutdownSignal::ALL);

        for signal in ShutdownSignal::ALL {
            bindings.deliver(signal).unwrap().await.unwrap();
            let report = bindings.next_report().await.unwrap().unwrap();
            assert_eq!(report.signal, Some(signal));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_does_not_block() {
        let (rt, mut bindings) = setup(2).await;
        let main = rt.attach("main").await.unwrap();

        let pending = bindings.deliver(ShutdownSignal::Terminate).unwrap();
        assert!(!pending.is_finished());
        assert!(bindings.try_report().is_none());

        let report = bindings.next_report().await.unwrap().unwrap();
        assert_eq!(report.cancelled, ["worker-1", "worker-2"]);
        assert_eq!(report.remaining, 0);
        assert_eq!(main.lifecycle(), Lifecycle::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_signals_back_to_back() {
        let (rt, mut bindings) = setup(3).await;
        let _main = rt.attach("main").await.unwrap();

        bindings.deliver(ShutdownSignal::Interrupt).unwrap();
        time::sleep(Duration::from_millis(100)).await;
        bindings.deliver(ShutdownSignal::Terminate).unwrap();

        let mut reports = Vec::new();
        for _ in 0..2 {
            reports.push(bindings.next_report().await.unwrap().unwrap());
        }
        reports.sort_by_key(|r| r.signal);

        let (int, term) = (&reports[0], &reports[1]);
        assert_eq!(int.signal, Some(ShutdownSignal::Interrupt));
        assert_eq!(int.cancelled.len(), 3);
        assert!(term.cancelled.len() <= int.cancelled.len());
        assert_eq!(rt.registry().list().await, ["main"]);
    }

    #[tokio::test]
    async fn test_duplicate_signals_bound_once() {
        let rt = Runtime::new(Bus::new(16));
        let listener = SignalListener::new(
            Arc::new(Coordinator::new(rt.clone())),
            ExclusionSet::new(),
            rt.bus().clone(),
        );
        let bindings = listener
            .bind(&[ShutdownSignal::Hangup, ShutdownSignal::Hangup])
            .unwrap();
        assert_eq!(bindings.signals(), [ShutdownSignal::Hangup]);
        assert!(bindings.deliver(ShutdownSignal::Terminate).is_none());
    }
}
