//! Virtual database operations.

use async_trait::async_trait;
use serde_json::json;

use crate::error::EngineError;
use crate::session::EngineSession;

use super::{Operation, Submission};

pub struct RefreshVdb {
    pub name: String,
}

#[async_trait]
impl Operation for RefreshVdb {
    fn describe(&self) -> String {
        format!("refresh VDB '{}'", self.name)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let database = session.find_database(&self.name).await?;
        session
            .submit(
                "vdb refresh",
                &format!("api/databases/{}/refresh", database.reference),
                json!({}),
            )
            .await
    }
}

pub struct DeleteVdb {
    pub name: String,
    pub force: bool,
}

#[async_trait]
impl Operation for DeleteVdb {
    fn describe(&self) -> String {
        format!("delete VDB '{}'", self.name)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let database = session.find_database(&self.name).await?;
        let source = session.source_for_database(&database.reference).await?;
        // Deleting a physical or staging source would destroy real data.
        if !source.is_virtual || source.staging {
            return Err(EngineError::remote(
                "vdb delete",
                format!("'{}' is not a virtual database", self.name),
            ));
        }
        session
            .submit(
                "vdb delete",
                &format!("api/databases/{}/delete", database.reference),
                json!({ "force": self.force }),
            )
            .await
    }
}
