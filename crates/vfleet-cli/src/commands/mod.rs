//! Command plumbing: each domain subcommand builds an [`Operation`], and
//! everything after that is shared. Load the catalog, wire up signals and
//! the event reporter, run the fleet, then hand the report back to `main`
//! for the exit-code decision.

pub mod container;
pub mod engines;
pub mod replication;
pub mod vdb;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, mpsc};

use vfleet_engine::{
    EngineCatalog, EngineError, EventReceiver, FleetReport, Operation, WorkerEventKind, run_fleet,
};

use crate::opts::FleetOpts;

pub struct FleetRun {
    pub report: FleetReport,
    /// Data produced by synchronous operations (listings), per engine.
    pub data: BTreeMap<String, Value>,
}

/// Run one operation across the selected engines.
///
/// Errors returned here are pre-worker failures (catalog or target
/// resolution); anything that happens after workers start is captured in
/// the report instead.
pub async fn run_command(opts: &FleetOpts, op: Arc<dyn Operation>) -> Result<FleetRun, EngineError> {
    let catalog = EngineCatalog::load(&opts.config)?;
    let selector = opts.selector();

    let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

    // Ctrl-C and SIGTERM fan out to every worker; each converts the signal
    // into an orderly aborted outcome at its next loop boundary.
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        let mut term =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl-C received, stopping workers...");
            }
            _ = async {
                if let Some(ref mut t) = term { t.recv().await; }
            } => {
                tracing::info!("SIGTERM received, stopping workers...");
            }
        }
        let _ = signal_tx.send(());
    });

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_events(event_rx));

    let report = run_fleet(
        &catalog,
        &selector,
        op,
        opts.worker_config(),
        &shutdown_tx,
        event_tx,
    )
    .await?;

    // All event senders are gone once the fleet run returns, so the
    // reporter drains and finishes.
    let data = reporter
        .await
        .map_err(|e| EngineError::Internal(format!("event reporter failed: {e}")))?;

    Ok(FleetRun { report, data })
}

/// Render worker events as log lines and collect synchronous results.
///
/// The poll loop emits structured events and never prints; this subscriber
/// is the one place display happens during a run.
async fn report_events(mut rx: EventReceiver) -> BTreeMap<String, Value> {
    let mut collected = BTreeMap::new();
    while let Some(event) = rx.recv().await {
        let engine = event.engine;
        match event.kind {
            WorkerEventKind::SessionOpened => {
                tracing::debug!("{engine}: session established");
            }
            WorkerEventKind::Submitted { job, description } => {
                tracing::info!("{engine}: {description} accepted as job {job}");
            }
            WorkerEventKind::Completed { description, data } => {
                tracing::info!("{engine}: {description} completed");
                if let Some(value) = data {
                    collected.insert(engine, value);
                }
            }
            WorkerEventKind::JobProgress { job, state, percent } => {
                tracing::info!("{engine}: job {job} {state} ({percent:.0}%)");
            }
            WorkerEventKind::JobRetired { job, state } => {
                tracing::info!("{engine}: job {job} finished {state}");
            }
            WorkerEventKind::Failed { error } => {
                tracing::error!("{engine}: {error}");
            }
            WorkerEventKind::Aborted => {
                tracing::warn!("{engine}: aborted by operator");
            }
        }
    }
    collected
}
