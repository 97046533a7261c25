use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, warn};
use uuid::Uuid;

use cronhook_dispatch::{DispatchError, RequestDispatcher};

use crate::types::{Job, JobId};

/// One execution slot for a fired occurrence.
#[derive(Debug, Clone)]
pub struct JobExecution {
    pub id: Uuid,
    pub job_id: JobId,
    pub started_at: DateTime<Utc>,
}

/// The execution collaborator the engine hands fired occurrences to.
///
/// Dispatch and outcome recording happen here; nothing propagates back to
/// the engine — if a call fails, the next scheduled occurrence is the retry.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    fn create_execution(&self, job: &Job) -> JobExecution;
    async fn execute(&self, execution: JobExecution, job: &Job);
}

/// Executor that sends the job's HTTP request exactly once per occurrence
/// and records the outcome in the `executions` table.
pub struct DispatchingExecutor {
    dispatcher: RequestDispatcher,
    conn: Mutex<Connection>,
}

impl DispatchingExecutor {
    pub fn new(dispatcher: RequestDispatcher, conn: Connection) -> Self {
        Self {
            dispatcher,
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl JobExecutor for DispatchingExecutor {
    fn create_execution(&self, job: &Job) -> JobExecution {
        let execution = JobExecution {
            id: Uuid::new_v4(),
            // Jobs handed to the executor come from the store and carry an id.
            job_id: job.id.unwrap_or_default(),
            started_at: Utc::now(),
        };

        let conn = self.conn.lock().unwrap();
        if let Err(e) = conn.execute(
            "INSERT INTO executions (id, job_id, started_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                execution.id.to_string(),
                execution.job_id,
                execution.started_at.to_rfc3339(),
            ],
        ) {
            warn!(job_id = execution.job_id, error = %e, "failed to record execution start");
        }
        execution
    }

    async fn execute(&self, execution: JobExecution, job: &Job) {
        let result = self.dispatcher.send(&job.request).await;

        let (outcome, status_code, error) = match &result {
            Ok(()) => ("success", Some(200i64), None),
            Err(DispatchError::RequestFailed { status, .. }) => {
                ("http-error", Some(*status as i64), Some(result_text(&result)))
            }
            Err(DispatchError::UnsupportedMethod(_)) => {
                ("unsupported-method", None, Some(result_text(&result)))
            }
            Err(DispatchError::Transport(_)) => {
                ("transport-error", None, Some(result_text(&result)))
            }
        };

        {
            let conn = self.conn.lock().unwrap();
            if let Err(e) = conn.execute(
                "UPDATE executions SET finished_at=?1, outcome=?2, status_code=?3, error=?4
                 WHERE id=?5",
                rusqlite::params![
                    Utc::now().to_rfc3339(),
                    outcome,
                    status_code,
                    error,
                    execution.id.to_string(),
                ],
            ) {
                warn!(job_id = execution.job_id, error = %e, "failed to record execution outcome");
            }
        }

        match result {
            Ok(()) => debug!(job_id = execution.job_id, "occurrence dispatched"),
            Err(e) => warn!(
                job_id = execution.job_id,
                error = %e,
                "dispatch failed; next scheduled occurrence is the retry"
            ),
        }
    }
}

fn result_text(result: &cronhook_dispatch::Result<()>) -> String {
    match result {
        Ok(()) => String::new(),
        Err(e) => e.to_string(),
    }
}
