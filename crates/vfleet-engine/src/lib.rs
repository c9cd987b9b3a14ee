//! Core library for the `vfleet` tooling: the multi-engine asynchronous
//! operation orchestrator.
//!
//! The moving parts, leaves first:
//!
//! - [`config`]: the engine catalog file and target-set resolution.
//! - [`session`]: one authenticated connection per engine, owned by exactly
//!   one worker.
//! - [`ops`]: the operation submitter, one remote mutating call per
//!   invocation, never auto-retried.
//! - [`jobs`]: the per-worker job tracker table.
//! - [`worker`]: the per-engine poll loop state machine.
//! - [`coordinator`]: fan-out across the resolved target set, join, and the
//!   aggregated fleet report.
//!
//! Display is not wired into any of this: state transitions surface as
//! [`events::WorkerEvent`]s on a channel the caller subscribes to.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod jobs;
pub mod ops;
pub mod session;
pub mod worker;

pub use config::{EngineCatalog, EngineTarget, TargetSelector};
pub use coordinator::{EngineOutcome, FleetReport, run_fleet};
pub use error::EngineError;
pub use events::{EventReceiver, EventSender, WorkerEvent, WorkerEventKind};
pub use jobs::JobTracker;
pub use ops::{Operation, Submission};
pub use session::EngineSession;
pub use worker::WorkerConfig;
