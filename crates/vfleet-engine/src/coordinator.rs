//! Engine fan-out: resolve the target set, start one worker per engine,
//! join them all, and fold the outcomes into a single report.
//!
//! There is deliberately no fail-fast cancellation of sibling workers: a
//! fleet-wide command makes maximum forward progress across all reachable
//! engines, and one engine's outage or slow job never blocks the others.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::{EngineCatalog, TargetSelector};
use crate::error::EngineError;
use crate::events::EventSender;
use crate::ops::Operation;
use crate::worker::{WorkerConfig, run_worker};

/// Terminal result of one engine's worker.
#[derive(Debug)]
pub enum EngineOutcome {
    Done,
    Failed(EngineError),
    Aborted,
}

impl EngineOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, EngineOutcome::Done)
    }
}

/// One slot per engine, written once by its own worker, read after join.
#[derive(Debug, Default)]
pub struct FleetReport {
    pub outcomes: BTreeMap<String, EngineOutcome>,
}

impl FleetReport {
    /// Overall success: every spawned worker reached `Done`.
    pub fn success(&self) -> bool {
        self.outcomes.values().all(EngineOutcome::is_done)
    }

    pub fn interrupted(&self) -> bool {
        self.outcomes
            .values()
            .any(|o| matches!(o, EngineOutcome::Aborted))
    }

    /// Engines that did not reach `Done`, with their causes.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &EngineOutcome)> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_done())
            .map(|(name, o)| (name.as_str(), o))
    }
}

/// Run one operation across the resolved target set.
///
/// Fails with a pre-worker error (`Config`/`UnknownEngine`/`NoTargetEngine`)
/// before any worker starts; once workers are spawned, every per-engine
/// failure is captured in the report instead. The call waits for all
/// workers to finish before reporting.
pub async fn run_fleet(
    catalog: &EngineCatalog,
    selector: &TargetSelector,
    op: Arc<dyn Operation>,
    config: WorkerConfig,
    shutdown: &broadcast::Sender<()>,
    events: EventSender,
) -> Result<FleetReport, EngineError> {
    let targets = catalog.resolve(selector)?;
    tracing::debug!(engines = targets.len(), "starting fleet run");

    let mut handles = Vec::with_capacity(targets.len());
    for target in targets {
        let name = target.name.clone();
        let handle = tokio::spawn(run_worker(
            target,
            op.clone(),
            config.clone(),
            shutdown.subscribe(),
            events.clone(),
        ));
        handles.push((name, handle));
    }

    let mut report = FleetReport::default();
    for (name, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => EngineOutcome::Failed(EngineError::Internal(format!(
                "worker for '{name}' did not finish: {join_err}"
            ))),
        };
        report.outcomes.insert(name, outcome);
    }
    Ok(report)
}
