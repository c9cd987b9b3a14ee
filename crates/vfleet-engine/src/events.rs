//! Structured worker events.
//!
//! The poll loop emits one event per state transition and performs no
//! printing itself; whoever subscribes to the channel decides how (and
//! whether) to render them.

use serde_json::Value;
use tokio::sync::mpsc;

use vfleet_api::{JobRef, JobState};

pub type EventSender = mpsc::UnboundedSender<WorkerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<WorkerEvent>;

#[derive(Clone, Debug)]
pub struct WorkerEvent {
    pub engine: String,
    pub kind: WorkerEventKind,
}

#[derive(Clone, Debug)]
pub enum WorkerEventKind {
    SessionOpened,
    /// The work item was dispatched and the engine accepted it as a job.
    Submitted {
        job: JobRef,
        description: String,
    },
    /// The work item completed synchronously, optionally with displayable
    /// data (listings).
    Completed {
        description: String,
        data: Option<Value>,
    },
    /// One status observation for an outstanding job.
    JobProgress {
        job: JobRef,
        state: JobState,
        percent: f64,
    },
    /// Terminal status observed; the job left the tracker. Emitted exactly
    /// once per job.
    JobRetired {
        job: JobRef,
        state: JobState,
    },
    Failed {
        error: String,
    },
    Aborted,
}

pub(crate) fn emit(events: &EventSender, engine: &str, kind: WorkerEventKind) {
    // The subscriber may have gone away; the loop does not care.
    let _ = events.send(WorkerEvent {
        engine: engine.to_string(),
        kind,
    });
}
