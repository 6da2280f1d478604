use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use shutdown_harness::{Config, ShutdownSignal, Subscribe, Supervisor};

/// Runs idle workers until a termination signal arrives, then shuts them down in order.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Number of workers to start.
    #[arg(long, default_value_t = 3)]
    workers: usize,

    /// Pause between two work iterations (e.g. "1s", "250ms").
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Time each worker spends cleaning up after cancellation.
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    cleanup: Duration,

    /// Registry name of the entrypoint task.
    #[arg(long, default_value = "main")]
    entrypoint: String,

    /// Signals that trigger a shutdown (repeatable). Defaults to SIGHUP, SIGINT and SIGTERM.
    #[arg(long = "signal", value_name = "SIGNAL")]
    signals: Vec<ShutdownSignal>,

    /// Log filter directive, overridden by RUST_LOG.
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl Args {
    fn config(&self) -> Config {
        let mut cfg = Config {
            workers: self.workers,
            interval: self.interval,
            cleanup: self.cleanup,
            entrypoint: self.entrypoint.clone(),
            ..Config::default()
        };
        if !self.signals.is_empty() {
            cfg.signals = self.signals.clone();
        }
        cfg
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(shutdown_harness::LogWriter::new())];
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    let sup = Supervisor::builder(args.config())
        .with_subscribers(subs)
        .build();

    sup.run().await.context("shutdown did not complete cleanly")?;
    Ok(())
}
