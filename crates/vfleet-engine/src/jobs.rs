//! Per-worker job registry: tracking key to outstanding job handle.
//!
//! The table is private to one poll loop. At most one outstanding handle per
//! key; entries leave the table the moment their status is observed
//! terminal, and a retired key is never polled again.

use std::collections::HashMap;

use vfleet_api::{JobRef, JobView};

use crate::error::EngineError;
use crate::session::EngineSession;

#[derive(Debug, Default)]
pub struct JobTracker {
    jobs: HashMap<String, JobRef>,
}

impl JobTracker {
    pub fn new() -> Self {
        JobTracker::default()
    }

    /// Insert a handle under a key with no outstanding handle.
    ///
    /// One in-flight job per key is a programming contract in this design;
    /// a second insert under the same key is a caller bug.
    pub fn track(&mut self, key: impl Into<String>, job: JobRef) {
        let key = key.into();
        let previous = self.jobs.insert(key.clone(), job);
        assert!(
            previous.is_none(),
            "job already outstanding for tracking key '{key}'"
        );
    }

    /// Fetch current status for every tracked job through the owning
    /// session.
    ///
    /// A fetch failure surfaces without removing any entry, so the next
    /// poll cycle retries the read-only fetch.
    pub async fn poll_all(
        &self,
        session: &EngineSession,
    ) -> Result<Vec<(String, JobView)>, EngineError> {
        let mut keys: Vec<&String> = self.jobs.keys().collect();
        keys.sort();
        let mut statuses = Vec::with_capacity(keys.len());
        for key in keys {
            let view = session.job(&self.jobs[key]).await?;
            statuses.push((key.clone(), view));
        }
        Ok(statuses)
    }

    /// Remove a key whose status was observed terminal.
    pub fn retire(&mut self, key: &str) -> Option<JobRef> {
        self.jobs.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retire_empties_the_table() {
        let mut tracker = JobTracker::new();
        tracker.track("east", JobRef::from("JOB-1"));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.retire("east"), Some(JobRef::from("JOB-1")));
        assert!(tracker.is_empty());
        assert_eq!(tracker.retire("east"), None);
    }

    #[test]
    fn distinct_keys_may_be_outstanding_together() {
        let mut tracker = JobTracker::new();
        tracker.track("east", JobRef::from("JOB-1"));
        tracker.track("west", JobRef::from("JOB-2"));
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    #[should_panic(expected = "already outstanding")]
    fn double_track_is_a_contract_bug() {
        let mut tracker = JobTracker::new();
        tracker.track("east", JobRef::from("JOB-1"));
        tracker.track("east", JobRef::from("JOB-2"));
    }
}
