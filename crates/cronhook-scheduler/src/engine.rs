use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::error::{Result, SchedulerError};
use crate::executor::JobExecutor;
use crate::handle::{decode_handle, encode_handle};
use crate::store::JobStore;
use crate::timer::{OccurrenceEvent, TimerService};
use crate::types::{Job, JobId};

/// Orchestrates job creation, removal, restart recovery and occurrence
/// handling. Purely reactive: the timer service is the sole scheduling
/// authority and every collaborator is injected explicitly.
pub struct SchedulerEngine {
    store: Arc<dyn JobStore>,
    timers: Arc<dyn TimerService>,
    executor: Arc<dyn JobExecutor>,
}

impl SchedulerEngine {
    pub fn new(
        store: Arc<dyn JobStore>,
        timers: Arc<dyn TimerService>,
        executor: Arc<dyn JobExecutor>,
    ) -> Self {
        Self {
            store,
            timers,
            executor,
        }
    }

    /// Create a job: validate its schedule, persist it, register its timer
    /// with the final identity as correlation token, and store the
    /// serialized timer handle. Returns the fully populated job.
    ///
    /// Persist-first ordering: the record is inserted before the timer is
    /// registered so the correlation token always equals the store-assigned
    /// identity. A crash between the two steps leaves a record without a
    /// handle, which [`SchedulerEngine::restore_jobs`] re-arms on restart.
    pub fn create_job(&self, mut job: Job) -> Result<Job> {
        if let Some(id) = job.id {
            if self.store.find_job(id)?.is_some() {
                return Err(SchedulerError::JobAlreadyExists { id });
            }
        }
        job.schedule.validate()?;

        let id = self.store.insert_job(&job)?;
        job.id = Some(id);

        let handle = self.timers.register_calendar_timer(&job.schedule, id, true)?;
        job.timer_handle = Some(encode_handle(&handle)?);
        self.store.update_job(&job)?;

        info!(
            job_id = id,
            expression = %job.schedule.to_cron_expression(),
            "job created"
        );
        Ok(job)
    }

    /// Remove a job: delete the record, then cancel its live timer.
    /// Idempotent — an absent identity is a logged no-op, and a stale
    /// timer handle is not an error.
    pub fn remove_job(&self, id: JobId) -> Result<()> {
        let Some(job) = self.store.find_job(id)? else {
            info!(job_id = id, "job not found, nothing to remove");
            return Ok(());
        };

        self.store.delete_job(id)?;

        if let Some(ref bytes) = job.timer_handle {
            match decode_handle(bytes) {
                Ok(handle) => {
                    if !self.timers.cancel(&handle) {
                        info!(job_id = id, "timer already gone");
                    }
                }
                Err(e) => {
                    // The record is gone either way; an unreadable handle only
                    // means the orphaned-timer path will clean up on next fire.
                    error!(job_id = id, error = %e, "stored timer handle unreadable, skipping cancel");
                }
            }
        }
        info!(job_id = id, "job removed");
        Ok(())
    }

    /// Decide what one timer firing means: skip a stale delivery, clean up
    /// an orphaned timer, suppress an inactive job, or dispatch exactly once.
    /// Errors on this path are terminal — logged and dropped, never retried.
    pub async fn handle_occurrence(&self, event: OccurrenceEvent) {
        if event.time_remaining < chrono::Duration::zero() {
            info!(job_id = event.token, "skipping missed occurrence");
            return;
        }

        let job = match self.store.find_job(event.token) {
            Ok(job) => job,
            Err(e) => {
                error!(job_id = event.token, error = %e, "job lookup failed, dropping occurrence");
                return;
            }
        };

        let Some(job) = job else {
            info!(job_id = event.token, "no job for occurrence, cancelling orphaned timer");
            self.timers.cancel_live(event.timer_id);
            return;
        };

        if !job.active {
            info!(job_id = event.token, "job is inactive, suppressing dispatch");
            return;
        }

        let execution = self.executor.create_execution(&job);
        self.executor.execute(execution, &job).await;
    }

    /// Restart recovery: re-arm a timer for every persisted job whose stored
    /// handle no longer resolves to a live timer, and persist the new handle.
    /// Returns the number of timers re-registered.
    pub fn restore_jobs(&self) -> Result<usize> {
        let mut restored = 0;
        for mut job in self.store.list_jobs()? {
            let Some(id) = job.id else { continue };

            let live = job
                .timer_handle
                .as_deref()
                .and_then(|bytes| decode_handle(bytes).ok())
                .map(|handle| self.timers.resolve(&handle))
                .unwrap_or(false);
            if live {
                continue;
            }

            let handle = self.timers.register_calendar_timer(&job.schedule, id, true)?;
            job.timer_handle = Some(encode_handle(&handle)?);
            self.store.update_job(&job)?;
            restored += 1;
        }
        if restored > 0 {
            info!(count = restored, "timers re-registered after restart");
        }
        Ok(restored)
    }

    /// Flip the activation flag. Returns `false` when the job does not exist.
    /// The timer keeps firing either way; only dispatch is suppressed.
    pub fn set_active(&self, id: JobId, active: bool) -> Result<bool> {
        let Some(mut job) = self.store.find_job(id)? else {
            return Ok(false);
        };
        job.active = active;
        self.store.update_job(&job)?;
        info!(job_id = id, active, "job activation updated");
        Ok(true)
    }

    pub fn find_job(&self, id: JobId) -> Result<Option<Job>> {
        self.store.find_job(id)
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>> {
        self.store.list_jobs()
    }

    /// Drive occurrences from the timer service's event channel until the
    /// channel closes or `shutdown` broadcasts `true`.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<OccurrenceEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("scheduler engine started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_occurrence(event).await,
                    None => break,
                },
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }
}
