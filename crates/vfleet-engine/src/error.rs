use thiserror::Error;

/// Error taxonomy for fleet operations.
///
/// `Config`, `UnknownEngine` and `NoTargetEngine` are only produced before
/// any worker starts. Everything else is caught at the owning engine's
/// worker boundary and recorded in that engine's outcome slot; it never
/// propagates to sibling workers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("engine '{0}' is not present in the engine catalog")]
    UnknownEngine(String),
    #[error("no engine named on the command line and no default engine configured")]
    NoTargetEngine,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine rejected {action}: {details}")]
    Remote { action: String, details: String },
    #[error("no {kind} named '{name}' found on the engine")]
    NotFound { kind: &'static str, name: String },
    #[error("job {job} finished {state}")]
    JobFailed {
        job: vfleet_api::JobRef,
        state: vfleet_api::JobState,
    },
    #[error("interrupted by operator")]
    Aborted,
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn remote(action: impl Into<String>, details: impl Into<String>) -> Self {
        EngineError::Remote {
            action: action.into(),
            details: details.into(),
        }
    }

    /// Transport failures are the only class retried transparently, and only
    /// on the read-only status poll path.
    pub fn is_transport(&self) -> bool {
        matches!(self, EngineError::Transport(_))
    }
}
