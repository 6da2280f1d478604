//! # Supervisor: the runtime entrypoint.
//!
//! The [`Supervisor`] owns the event bus, the [`Runtime`] handle and the
//! [`SubscriberSet`]. It starts workers, binds termination signals to the
//! shutdown coordinator and waits for every worker to terminate.
//!
//! ## High-level architecture
//! ```text
//! run()
//!   ├─► subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   ├─► Runtime::attach(cfg.entrypoint)            (the entrypoint's own identity)
//!   ├─► SignalListener::bind(cfg.signals)          exclude = { cfg.entrypoint }
//!   ├─► Runtime::spawn(worker-1 .. worker-N)   (on error: cancel and await the ones started)
//!   └─► wait_all():
//!         ├─ all workers terminated ─► Ok / Err(TaskFailed{first fault})
//!         └─ coordinator report Err  ─► Err(CleanupFailed)
//!
//! Shutdown path (per signal delivery):
//!   SignalHandler::fire() ─► tokio::spawn(Coordinator::shutdown(request))
//!        └─► cancel all but the entrypoint ─► workers clean up ─► Terminated
//!              └─► entrypoint's wait resolves ─► run() returns
//! ```
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use shutdown_harness::{Config, Subscribe, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(shutdown_harness::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let sup = Supervisor::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!
//!     // Runs until SIGHUP/SIGINT/SIGTERM and every worker has cleaned up.
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use tokio::task::JoinHandle;

use super::{
    builder::SupervisorBuilder,
    config::Config,
    coordinator::Coordinator,
    handle::TaskHandle,
    listener::{Bindings, ShutdownOutcome, SignalListener},
    runtime::Runtime,
};
use crate::{
    error::RuntimeError,
    events::{Bus, Event, EventKind},
    subscribers::SubscriberSet,
    tasks::{TaskRef, Worker},
};

/// Starts workers, binds signals, and waits for an orderly shutdown.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    runtime: Runtime,
    subs: Mutex<Option<SubscriberSet>>,
}

impl Supervisor {
    pub(crate) fn new_internal(cfg: Config, bus: Bus, subs: SubscriberSet) -> Self {
        let runtime = Runtime::new(bus.clone());
        Self {
            cfg,
            bus,
            runtime,
            subs: Mutex::new(Some(subs)),
        }
    }

    /// Creates a builder for the given configuration.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Runtime handle shared with every component.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Starts `cfg.workers` idle workers and runs until they have all terminated.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        let workers = self
            .cfg
            .worker_names()
            .map(|name| Worker::from_config(name, &self.cfg).arc())
            .collect();
        self.run_with(workers).await
    }

    /// Binds signals on `cfg.signals`, starts `tasks`, and runs until they have all terminated.
    pub async fn run_with(&self, tasks: Vec<TaskRef>) -> Result<(), RuntimeError> {
        let listener = SignalListener::new(
            self.coordinator(),
            self.cfg.exclusion(),
            self.bus.clone(),
        );
        let bindings = listener.bind(&self.cfg.signals)?;
        self.run_bound(bindings, tasks).await
    }

    /// Coordinator used by signal handlers.
    pub fn coordinator(&self) -> Arc<Coordinator> {
        Arc::new(Coordinator::new(self.runtime.clone()))
    }

    /// Runs with already installed `bindings` (e.g. a subset of signals).
    pub async fn run_bound(
        &self,
        mut bindings: Bindings,
        tasks: Vec<TaskRef>,
    ) -> Result<(), RuntimeError> {
        let flush = self.subscriber_listener();

        let res = match self.runtime.attach(&self.cfg.entrypoint).await {
            Ok(main) => {
                let res = self.supervise(&mut bindings, tasks).await;
                main.terminate(Ok(()));
                res
            }
            Err(e) => Err(e),
        };

        let mut ev = Event::new(EventKind::EntrypointFinished).with_task(self.cfg.entrypoint.as_str());
        if let Err(e) = &res {
            ev = ev.with_reason(e.to_string());
        }
        self.bus.publish(ev);

        if let Some(flush) = flush {
            let _ = flush.await;
        }
        res
    }

    async fn supervise(
        &self,
        bindings: &mut Bindings,
        tasks: Vec<TaskRef>,
    ) -> Result<(), RuntimeError> {
        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.runtime.spawn(task).await {
                Ok(h) => handles.push(h),
                Err(e) => {
                    release(&handles).await;
                    return Err(e);
                }
            }
        }
        self.wait_all(bindings, &handles).await
    }

    /// Waits until every handle is terminated or a shutdown reports a fault.
    async fn wait_all(
        &self,
        bindings: &mut Bindings,
        handles: &[TaskHandle],
    ) -> Result<(), RuntimeError> {
        let all = join_all(handles.iter().map(TaskHandle::terminated));
        tokio::pin!(all);

        let outcomes = loop {
            tokio::select! {
                outcomes = &mut all => break outcomes,
                Some(report) = bindings.next_report() => check(report)?,
            }
        };

        // let a coordinator woken by the same terminations report first
        tokio::task::yield_now().await;
        while let Some(report) = bindings.try_report() {
            check(report)?;
        }

        match handles.iter().zip(outcomes).find_map(|(h, o)| o.err().map(|e| (h, e))) {
            Some((h, error)) => Err(RuntimeError::TaskFailed {
                task: h.name().to_string(),
                error,
            }),
            None => Ok(()),
        }
    }

    /// Forwards bus events to the subscriber set until the entrypoint finishes,
    /// then drains every subscriber queue.
    ///
    /// Returns `None` if the subscribers were already taken by an earlier run.
    fn subscriber_listener(&self) -> Option<JoinHandle<()>> {
        let set = self.subs.lock().ok()?.take()?;
        let mut rx = self.bus.subscribe();

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        set.emit(&ev);
                        if ev.kind == EventKind::EntrypointFinished {
                            break;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
            set.shutdown().await;
        }))
    }
}

/// Cancels tasks started before a failed spawn and waits until they are gone.
///
/// Their outcomes are dropped; the spawn error is what the caller reports.
async fn release(handles: &[TaskHandle]) {
    for h in handles {
        h.cancel();
    }
    join_all(handles.iter().map(TaskHandle::terminated)).await;
}

fn check(report: ShutdownOutcome) -> Result<(), RuntimeError> {
    report.map(|_| ())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use super::*;
    use crate::core::{Lifecycle, ShutdownRequest, ShutdownSignal, SignalHandler};
    use crate::error::TaskError;
    use crate::subscribers::Subscribe;
    use crate::tasks::{TaskContext, Work};

    fn config(workers: usize) -> Config {
        Config {
            workers,
            signals: Vec::new(),
            ..Config::default()
        }
    }

    /// Bindings without OS handlers plus a handler feeding the same report channel.
    fn manual_bindings(sup: &Supervisor, signal: ShutdownSignal) -> (Bindings, SignalHandler) {
        let listener = SignalListener::new(sup.coordinator(), sup.config().exclusion(), sup.bus.clone());
        let trigger = listener.handler(signal);
        (listener.bind(&[]).unwrap(), trigger)
    }

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, ev: &Event) {
            if ev.kind == EventKind::WorkerCancelled {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct BrokenCleanup;

    #[async_trait]
    impl Work for BrokenCleanup {
        async fn cleanup(&self, _ctx: &TaskContext) -> Result<(), TaskError> {
            Err(TaskError::cleanup("socket already closed"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_returns_after_signal_and_flushes_events() {
        let cancelled = Arc::new(AtomicUsize::new(0));
        let sup = Arc::new(
            Supervisor::builder(config(3))
                .with_subscribers(vec![Arc::new(Counter(Arc::clone(&cancelled)))])
                .build(),
        );
        let (bindings, trigger) = manual_bindings(&sup, ShutdownSignal::Terminate);

        let runner = {
            let sup = Arc::clone(&sup);
            let tasks = sup
                .config()
                .worker_names()
                .map(|n| Worker::from_config(n, sup.config()).arc())
                .collect();
            tokio::spawn(async move { sup.run_bound(bindings, tasks).await })
        };

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(
            sup.runtime().registry().list().await,
            ["main", "worker-1", "worker-2", "worker-3"]
        );

        trigger.fire();
        runner.await.unwrap().unwrap();

        assert_eq!(cancelled.load(Ordering::SeqCst), 3);
        assert!(sup.runtime().registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_no_workers_returns_immediately() {
        let sup = Supervisor::builder(config(0)).build();
        sup.run().await.unwrap();
        assert!(sup.runtime().registry().is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entrypoint_is_never_cancelled() {
        let sup = Supervisor::builder(config(1)).build();
        let main = sup.runtime().attach("main").await.unwrap();
        let worker = sup
            .runtime()
            .spawn(Worker::from_config("worker-1", sup.config()).arc())
            .await
            .unwrap();

        let report = sup
            .coordinator()
            .shutdown(ShutdownRequest::new(ShutdownSignal::Interrupt, sup.config().exclusion()))
            .await
            .unwrap();

        assert_eq!(report.cancelled, ["worker-1"]);
        assert!(!main.is_cancel_requested());
        assert_eq!(main.lifecycle(), Lifecycle::Running);
        assert_eq!(worker.lifecycle(), Lifecycle::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_fault_escalates_to_entrypoint() {
        let sup = Arc::new(Supervisor::builder(config(0)).build());
        let (bindings, trigger) = manual_bindings(&sup, ShutdownSignal::Hangup);

        let tasks = vec![
            Worker::from_config("worker-1", sup.config()).arc(),
            Worker::from_config("worker-2", sup.config())
                .with_work(BrokenCleanup)
                .arc(),
        ];
        let runner = {
            let sup = Arc::clone(&sup);
            tokio::spawn(async move { sup.run_bound(bindings, tasks).await })
        };

        time::sleep(Duration::from_millis(100)).await;
        trigger.fire();

        match runner.await.unwrap().unwrap_err() {
            RuntimeError::CleanupFailed { task, signal, .. } => {
                assert_eq!(task, "worker-2");
                assert_eq!(signal, Some(ShutdownSignal::Hangup));
            }
            RuntimeError::TaskFailed { task, error } => {
                assert_eq!(task, "worker-2");
                assert!(error.is_terminal());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_spawn_releases_started_workers() {
        let sup = Supervisor::builder(config(0)).build();
        let tasks = vec![
            Worker::from_config("a", sup.config()).arc(),
            Worker::from_config("dup", sup.config()).arc(),
            Worker::from_config("dup", sup.config()).arc(),
        ];

        let err = sup.run_with(tasks).await.unwrap_err();
        assert_eq!(err.as_label(), "runtime_duplicate_task");
        assert!(sup.runtime().registry().is_empty().await);
    }
}
