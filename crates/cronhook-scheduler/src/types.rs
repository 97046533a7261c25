use serde::{Deserialize, Serialize};

use cronhook_core::RequestSpec;

use crate::schedule::Schedule;

/// Store-assigned job identity. Assigned on first insert, stable thereafter.
pub type JobId = i64;

/// A persisted HTTP call job.
///
/// Exactly one live timer exists per job; its serialized handle lives in
/// `timer_handle` so the association survives a process restart. An inactive
/// job keeps its timer — occurrences still fire, only dispatch is suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// `None` until the store assigns an identity on first insert.
    #[serde(default)]
    pub id: Option<JobId>,
    pub request: RequestSpec,
    #[serde(default)]
    pub schedule: Schedule,
    /// Jobs start active; flipping this pauses dispatch without touching
    /// the schedule or the timer.
    #[serde(default = "active_default")]
    pub active: bool,
    /// Opaque serialized timer handle. `None` until creation completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_handle: Option<Vec<u8>>,
}

fn active_default() -> bool {
    true
}

impl Job {
    pub fn new(request: RequestSpec, schedule: Schedule) -> Self {
        Self {
            id: None,
            request,
            schedule,
            active: true,
            timer_handle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_active_without_identity() {
        let job = Job::new(
            RequestSpec::new("GET", "https://example.test/"),
            Schedule::default(),
        );
        assert!(job.active);
        assert!(job.id.is_none());
        assert!(job.timer_handle.is_none());
    }

    #[test]
    fn deserializes_with_defaults() {
        let job: Job = serde_json::from_str(
            r#"{"request":{"method":"GET","url":"https://example.test/"}}"#,
        )
        .unwrap();
        assert!(job.active);
        assert_eq!(job.schedule, Schedule::default());
    }
}
