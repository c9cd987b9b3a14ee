//! Job references and the job state machine as the engine reports it.

use serde::{Deserialize, Serialize};

/// Opaque reference to a server-side job (e.g. `JOB-123`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobRef(pub String);

impl JobRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobRef {
    fn from(value: &str) -> Self {
        JobRef(value.to_string())
    }
}

/// Engine-reported job state.
///
/// `Running` and `Suspended` count as outstanding; the other three are
/// terminal and never transition again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Running,
    Suspended,
    Canceled,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Canceled | JobState::Completed | JobState::Failed
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobState::Running => "RUNNING",
            JobState::Suspended => "SUSPENDED",
            JobState::Canceled => "CANCELED",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Job view returned by `GET /api/jobs/{ref}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JobView {
    pub reference: JobRef,
    pub job_state: JobState,
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!JobState::Running.is_terminal());
        assert!(!JobState::Suspended.is_terminal());
        assert!(JobState::Canceled.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn job_view_decodes_wire_names() {
        let view: JobView = serde_json::from_str(
            r#"{"reference":"JOB-7","job_state":"SUSPENDED","percent_complete":42.5}"#,
        )
        .unwrap();
        assert_eq!(view.reference, JobRef::from("JOB-7"));
        assert_eq!(view.job_state, JobState::Suspended);
        assert_eq!(view.percent_complete, 42.5);
        assert!(view.target_name.is_none());
    }
}
