//! The response envelope the engine wraps every REST call in.
//!
//! A successful call carries `status: "OK"` and a `result`; an asynchronous
//! operation additionally carries a `job` reference. A rejected call carries
//! `status: "ERROR"` and an `error` body with operator-facing details.

use serde::{Deserialize, Serialize};

use crate::job::JobRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Ok,
    Error,
}

/// Error body attached to `status: "ERROR"` responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: ApiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<JobRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl<T> Envelope<T> {
    pub fn ok(result: T) -> Self {
        Envelope {
            status: ApiStatus::Ok,
            result: Some(result),
            job: None,
            error: None,
        }
    }

    pub fn job(job: JobRef) -> Self {
        Envelope {
            status: ApiStatus::Ok,
            result: None,
            job: Some(job),
            error: None,
        }
    }

    pub fn error(details: impl Into<String>, action: Option<String>) -> Self {
        Envelope {
            status: ApiStatus::Error,
            result: None,
            job: None,
            error: Some(ApiErrorBody {
                details: details.into(),
                action,
            }),
        }
    }
}

/// `POST /api/login` request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `POST /api/login` result: the bearer token for the session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResult {
    pub token: String,
}
