//! Authenticated session against one engine.
//!
//! A session is created by the worker that owns it, at the start of that
//! worker's poll loop, and is never shared: the transport is not safe to
//! share across concurrent operation streams against different hosts, so
//! each engine gets its own client and bearer token.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use vfleet_api::{
    ApiStatus, ContainerView, DatabaseView, Envelope, JobRef, JobView, LoginRequest, LoginResult,
    NamedRef, ObjectRef, SourceView,
};

use crate::config::EngineTarget;
use crate::error::EngineError;
use crate::ops::Submission;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct EngineSession {
    client: reqwest::Client,
    base: String,
    token: String,
}

impl EngineSession {
    /// Open a session: build the client and run the login flow.
    ///
    /// Session-establishment failures are fatal for this engine only; the
    /// caller records them without touching sibling engines.
    pub async fn connect(target: &EngineTarget) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base = target.base_url();

        let login = LoginRequest {
            username: target.username.clone(),
            password: target.password.clone(),
        };
        let env: Envelope<LoginResult> = client
            .post(format!("{base}/api/login"))
            .json(&login)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let result = check(env, "login")?
            .result
            .ok_or_else(|| EngineError::remote("login", "login returned no token"))?;

        Ok(EngineSession {
            client,
            base,
            token: result.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base.trim_end_matches('/'))
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
    ) -> Result<Envelope<T>, EngineError> {
        let env = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(env, action)
    }

    async fn post_envelope<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        action: &str,
    ) -> Result<Envelope<T>, EngineError> {
        let env = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check(env, action)
    }

    /// Fetch current status for one job. Read-only; the poll loop retries
    /// transport failures here, and nowhere else.
    pub async fn job(&self, job: &JobRef) -> Result<JobView, EngineError> {
        let action = "job status fetch";
        let env: Envelope<JobView> = self
            .get_envelope(&format!("api/jobs/{job}"), action)
            .await?;
        env.result
            .ok_or_else(|| EngineError::remote(action, "job view missing from response"))
    }

    /// List a collection endpoint.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        action: &str,
    ) -> Result<Vec<T>, EngineError> {
        let env: Envelope<Vec<T>> = self.get_envelope(path, action).await?;
        Ok(env.result.unwrap_or_default())
    }

    /// Issue one mutating operation. Exactly one remote call; retrying a
    /// submit may create a duplicate resource, so callers never do.
    pub async fn submit(
        &self,
        action: &str,
        path: &str,
        body: Value,
    ) -> Result<Submission, EngineError> {
        let env: Envelope<Value> = self.post_envelope(path, &body, action).await?;
        match env.job {
            Some(job) => Ok(Submission::Job(job)),
            None => Ok(Submission::Done(env.result)),
        }
    }

    /// Remove an owner. The one DELETE-shaped call in the surface.
    pub async fn submit_delete(
        &self,
        action: &str,
        path: &str,
    ) -> Result<Submission, EngineError> {
        let env: Envelope<Value> = {
            let env = self
                .client
                .delete(self.url(path))
                .bearer_auth(&self.token)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            check(env, action)?
        };
        match env.job {
            Some(job) => Ok(Submission::Job(job)),
            None => Ok(Submission::Done(env.result)),
        }
    }

    // Name-to-reference lookups. These run before any mutating call so that
    // submits only ever see stable references.

    pub async fn find_container(&self, name: &str) -> Result<ContainerView, EngineError> {
        find_by_name(
            self.list("api/containers", "container lookup").await?,
            |c: &ContainerView| &c.name,
            "container",
            name,
        )
    }

    pub async fn find_template(&self, name: &str) -> Result<NamedRef, EngineError> {
        find_by_name(
            self.list("api/templates", "template lookup").await?,
            |t: &NamedRef| &t.name,
            "template",
            name,
        )
    }

    pub async fn find_user(&self, name: &str) -> Result<NamedRef, EngineError> {
        find_by_name(
            self.list("api/users", "user lookup").await?,
            |u: &NamedRef| &u.name,
            "user",
            name,
        )
    }

    pub async fn find_database(&self, name: &str) -> Result<DatabaseView, EngineError> {
        find_by_name(
            self.list("api/databases", "database lookup").await?,
            |d: &DatabaseView| &d.name,
            "database",
            name,
        )
    }

    pub async fn find_bookmark(
        &self,
        container: &ObjectRef,
        name: &str,
    ) -> Result<NamedRef, EngineError> {
        find_by_name(
            self.list(
                &format!("api/containers/{container}/bookmarks"),
                "bookmark lookup",
            )
            .await?,
            |b: &NamedRef| &b.name,
            "bookmark",
            name,
        )
    }

    pub async fn find_replication_spec(&self, name: &str) -> Result<NamedRef, EngineError> {
        find_by_name(
            self.list("api/replication/specs", "replication spec lookup")
                .await?,
            |s: &NamedRef| &s.name,
            "replication spec",
            name,
        )
    }

    /// Source backing a database, used to refuse deleting non-virtual data.
    pub async fn source_for_database(
        &self,
        database: &ObjectRef,
    ) -> Result<SourceView, EngineError> {
        let sources: Vec<SourceView> = self
            .list(
                &format!("api/sources?database={database}"),
                "source lookup",
            )
            .await?;
        sources
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::NotFound {
                kind: "source",
                name: database.to_string(),
            })
    }
}

/// Map an `ERROR` envelope to the rejection it reports.
fn check<T>(env: Envelope<T>, action: &str) -> Result<Envelope<T>, EngineError> {
    match env.status {
        ApiStatus::Ok => Ok(env),
        ApiStatus::Error => {
            let details = env
                .error
                .map(|e| e.details)
                .unwrap_or_else(|| "engine returned an error with no details".into());
            Err(EngineError::remote(action, details))
        }
    }
}

fn find_by_name<T>(
    items: Vec<T>,
    name_of: impl Fn(&T) -> &String,
    kind: &'static str,
    name: &str,
) -> Result<T, EngineError> {
    items
        .into_iter()
        .find(|item| name_of(item).as_str() == name)
        .ok_or_else(|| EngineError::NotFound {
            kind,
            name: name.to_string(),
        })
}
