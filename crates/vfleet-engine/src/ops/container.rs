//! Self-service container lifecycle operations.

use async_trait::async_trait;
use serde_json::json;

use crate::error::EngineError;
use crate::session::EngineSession;

use super::{Operation, Submission};

/// Create a container from a template and a source database.
pub struct CreateContainer {
    pub name: String,
    pub template: String,
    pub database: String,
}

#[async_trait]
impl Operation for CreateContainer {
    fn describe(&self) -> String {
        format!("create container '{}'", self.name)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let template = session.find_template(&self.template).await?;
        let database = session.find_database(&self.database).await?;
        session
            .submit(
                "container create",
                "api/containers",
                json!({
                    "name": self.name,
                    "template": template.reference,
                    "source": database.reference,
                }),
            )
            .await
    }
}

pub struct DeleteContainer {
    pub name: String,
    /// Keep the underlying VDBs when deleting the container.
    pub keep_vdbs: bool,
}

#[async_trait]
impl Operation for DeleteContainer {
    fn describe(&self) -> String {
        format!("delete container '{}'", self.name)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let container = session.find_container(&self.name).await?;
        session
            .submit(
                "container delete",
                &format!("api/containers/{}/delete", container.reference),
                json!({ "keep_vdbs": self.keep_vdbs }),
            )
            .await
    }
}

pub struct RefreshContainer {
    pub name: String,
}

#[async_trait]
impl Operation for RefreshContainer {
    fn describe(&self) -> String {
        format!("refresh container '{}'", self.name)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let container = session.find_container(&self.name).await?;
        session
            .submit(
                "container refresh",
                &format!("api/containers/{}/refresh", container.reference),
                json!({}),
            )
            .await
    }
}

/// Restore a container to one of its named bookmarks.
pub struct RestoreContainer {
    pub name: String,
    pub bookmark: String,
}

#[async_trait]
impl Operation for RestoreContainer {
    fn describe(&self) -> String {
        format!(
            "restore container '{}' to bookmark '{}'",
            self.name, self.bookmark
        )
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let container = session.find_container(&self.name).await?;
        let bookmark = session
            .find_bookmark(&container.reference, &self.bookmark)
            .await?;
        session
            .submit(
                "container restore",
                &format!("api/containers/{}/restore", container.reference),
                json!({ "bookmark": bookmark.reference }),
            )
            .await
    }
}

pub struct AddOwner {
    pub container: String,
    pub user: String,
}

#[async_trait]
impl Operation for AddOwner {
    fn describe(&self) -> String {
        format!("add owner '{}' to container '{}'", self.user, self.container)
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let container = session.find_container(&self.container).await?;
        let user = session.find_user(&self.user).await?;
        session
            .submit(
                "owner add",
                &format!("api/containers/{}/owners", container.reference),
                json!({ "user": user.reference }),
            )
            .await
    }
}

pub struct RemoveOwner {
    pub container: String,
    pub user: String,
}

#[async_trait]
impl Operation for RemoveOwner {
    fn describe(&self) -> String {
        format!(
            "remove owner '{}' from container '{}'",
            self.user, self.container
        )
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let container = session.find_container(&self.container).await?;
        let user = session.find_user(&self.user).await?;
        session
            .submit_delete(
                "owner remove",
                &format!(
                    "api/containers/{}/owners/{}",
                    container.reference, user.reference
                ),
            )
            .await
    }
}

/// List containers on each target engine. Completes synchronously.
pub struct ListContainers;

#[async_trait]
impl Operation for ListContainers {
    fn describe(&self) -> String {
        "list containers".into()
    }

    async fn submit(&self, session: &EngineSession) -> Result<Submission, EngineError> {
        let containers: Vec<vfleet_api::ContainerView> =
            session.list("api/containers", "container list").await?;
        Ok(Submission::Done(Some(serde_json::to_value(containers).map_err(
            |e| EngineError::Internal(format!("encode container list: {e}")),
        )?)))
    }
}
