//! The per-engine poll loop.
//!
//! One worker per target engine: open the session, dispatch the one-shot
//! work item, then poll the job tracker until drained. Errors stop this
//! engine only; sibling workers never notice. Cancellation is checked at
//! the pre-submit boundary and at every poll-cycle boundary so an operator
//! abort is surfaced within one poll interval instead of orphaning a job
//! silently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;

use vfleet_api::JobState;

use crate::config::EngineTarget;
use crate::coordinator::EngineOutcome;
use crate::error::EngineError;
use crate::events::{EventSender, WorkerEventKind, emit};
use crate::jobs::JobTracker;
use crate::ops::{Operation, Submission};
use crate::session::EngineSession;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Delay between successive job-status checks.
    pub poll_interval: Duration,
    /// Consecutive status-fetch failures tolerated before the engine is
    /// declared unreachable.
    pub poll_failure_cap: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            poll_interval: Duration::from_secs(10),
            poll_failure_cap: 5,
        }
    }
}

/// Run one engine's workflow to completion, converting every failure mode
/// into that engine's outcome slot.
pub(crate) async fn run_worker(
    target: EngineTarget,
    op: Arc<dyn Operation>,
    config: WorkerConfig,
    mut shutdown: broadcast::Receiver<()>,
    events: EventSender,
) -> EngineOutcome {
    let engine = target.name.clone();
    match drive(&target, op, &config, &mut shutdown, &events).await {
        Ok(()) => EngineOutcome::Done,
        Err(EngineError::Aborted) => {
            emit(&events, &engine, WorkerEventKind::Aborted);
            EngineOutcome::Aborted
        }
        Err(err) => {
            emit(
                &events,
                &engine,
                WorkerEventKind::Failed {
                    error: err.to_string(),
                },
            );
            EngineOutcome::Failed(err)
        }
    }
}

async fn drive(
    target: &EngineTarget,
    op: Arc<dyn Operation>,
    config: &WorkerConfig,
    shutdown: &mut broadcast::Receiver<()>,
    events: &EventSender,
) -> Result<(), EngineError> {
    let engine = target.name.as_str();

    if cancelled(shutdown) {
        return Err(EngineError::Aborted);
    }

    let session = EngineSession::connect(target).await?;
    emit(events, engine, WorkerEventKind::SessionOpened);
    tracing::debug!(engine, "session established");

    let mut work = Some(op);
    let mut tracker = JobTracker::new();
    let mut poll_failures: u32 = 0;
    let mut failed_job: Option<EngineError> = None;

    while work.is_some() || !tracker.is_empty() {
        if cancelled(shutdown) {
            return Err(EngineError::Aborted);
        }

        if let Some(op) = work.take() {
            let description = op.describe();
            match op.submit(&session).await? {
                Submission::Job(job) => {
                    tracing::debug!(engine, %job, "operation accepted as job");
                    emit(
                        events,
                        engine,
                        WorkerEventKind::Submitted {
                            job: job.clone(),
                            description,
                        },
                    );
                    tracker.track(engine, job);
                }
                Submission::Done(data) => {
                    emit(
                        events,
                        engine,
                        WorkerEventKind::Completed { description, data },
                    );
                }
            }
        }

        if tracker.is_empty() {
            break;
        }

        match tracker.poll_all(&session).await {
            Ok(statuses) => {
                poll_failures = 0;
                for (key, view) in statuses {
                    emit(
                        events,
                        engine,
                        WorkerEventKind::JobProgress {
                            job: view.reference.clone(),
                            state: view.job_state,
                            percent: view.percent_complete,
                        },
                    );
                    if view.job_state.is_terminal() {
                        tracker.retire(&key);
                        emit(
                            events,
                            engine,
                            WorkerEventKind::JobRetired {
                                job: view.reference.clone(),
                                state: view.job_state,
                            },
                        );
                        if view.job_state != JobState::Completed {
                            failed_job = Some(EngineError::JobFailed {
                                job: view.reference,
                                state: view.job_state,
                            });
                        }
                    }
                }
            }
            // Polling is read-only, so transport failures here are retried
            // on the next cycle, up to the cap. Nothing leaves the tracker.
            Err(err) if err.is_transport() => {
                poll_failures += 1;
                if poll_failures >= config.poll_failure_cap {
                    return Err(err);
                }
                tracing::warn!(engine, attempt = poll_failures, "status fetch failed: {err}");
            }
            Err(err) => return Err(err),
        }

        if tracker.is_empty() {
            break;
        }

        tokio::select! {
            _ = sleep(config.poll_interval) => {}
            _ = shutdown.recv() => return Err(EngineError::Aborted),
        }
    }

    match failed_job {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn cancelled(shutdown: &mut broadcast::Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => true,
        Err(_) => false,
    }
}
