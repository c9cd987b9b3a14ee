//! Replication profile operations.

use async_trait::async_trait;
use serde_json::json;

use vfleet_api::NamedRef;

use crate::error::EngineError;
use crate::session::EngineSession;

use super::{Operation, Submission};

/// Execute a named replication profile.
pub struct RunReplication {
    pub profile: String,
}

#[async_trait]
impl Operation for RunReplication {
    fn describe(&self) -> String {
        format!("execute replication profile '{}'", self.profile)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let spec = session.find_replication_spec(&self.profile).await?;
        session
            .submit(
                "replication execute",
                &format!("api/replication/specs/{}/execute", spec.reference),
                json!({}),
            )
            .await
    }
}

/// List replication profiles. Completes synchronously.
pub struct ListReplicationSpecs;

#[async_trait]
impl Operation for ListReplicationSpecs {
    fn describe(&self) -> String {
        "list replication profiles".into()
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let specs: Vec<NamedRef> = session
            .list("api/replication/specs", "replication spec list")
            .await?;
        Ok(Submission::Done(Some(serde_json::to_value(specs).map_err(
            |e| EngineError::Internal(format!("encode replication spec list: {e}")),
        )?)))
    }
}
