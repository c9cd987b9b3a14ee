//! The operation submitter: each operation builds and issues exactly one
//! domain operation against a target engine.
//!
//! `submit` performs name-to-reference resolution through the session's
//! lookup helpers first, then makes a single remote mutating call. Submits
//! are never retried automatically: the engine does not guarantee
//! idempotency, and a retried create or delete could duplicate side
//! effects. Only the read-only status poll retries.

mod container;
mod replication;
mod vdb;

pub use container::{
    AddOwner, CreateContainer, DeleteContainer, ListContainers, RefreshContainer, RemoveOwner,
    RestoreContainer,
};
pub use replication::{ListReplicationSpecs, RunReplication};
pub use vdb::{DeleteVdb, RefreshVdb};

use async_trait::async_trait;
use serde_json::Value;

use vfleet_api::JobRef;

use crate::error::EngineError;
use crate::session::EngineSession;

/// Result of submitting an operation: the engine either accepted it as a
/// long-running job or completed it synchronously.
#[derive(Clone, Debug)]
pub enum Submission {
    Job(JobRef),
    Done(Option<Value>),
}

/// One CLI-requested action, dispatched once per engine worker.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Short operator-facing description, e.g. `refresh container 'app1'`.
    fn describe(&self) -> String;

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError>;
}
