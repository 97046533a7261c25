use std::sync::Arc;

use chrono::{Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::schedule::Schedule;
use crate::types::JobId;

/// Persistable reference to a live timer instance.
///
/// Ownership-neutral: the handle can be serialized to bytes, stored in the
/// job record, and later resolved back to the live timer — or used to re-arm
/// an equivalent timer after a restart, since it carries the schedule and
/// correlation token the timer was registered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerHandle {
    pub timer_id: Uuid,
    pub token: JobId,
    pub schedule: Schedule,
}

/// One firing of a registered timer.
#[derive(Debug, Clone)]
pub struct OccurrenceEvent {
    /// Correlation token — the job identity the timer was registered with.
    pub token: JobId,
    /// The live timer instance that fired.
    pub timer_id: Uuid,
    /// Time until the *next* occurrence. Negative means this delivery is a
    /// stale catch-up whose window has already passed.
    pub time_remaining: Duration,
}

/// The host timer primitive: registers calendar timers, resolves persisted
/// handles back to live timers, and cancels them. Occurrences are delivered
/// out-of-band through the service's event channel.
pub trait TimerService: Send + Sync {
    /// Register a timer for `schedule`, tagged with `token` as its
    /// correlation token. `persistent` timers are expected to be re-armed
    /// across restarts via their stored handle.
    fn register_calendar_timer(
        &self,
        schedule: &Schedule,
        token: JobId,
        persistent: bool,
    ) -> Result<TimerHandle>;

    /// True when the handle still refers to a live timer in this process.
    fn resolve(&self, handle: &TimerHandle) -> bool;

    /// Cancel via a persisted handle. Returns `false` when the timer is
    /// already gone (stale handle) — the goal of no future firings is
    /// satisfied either way, so this is not an error.
    fn cancel(&self, handle: &TimerHandle) -> bool;

    /// Cancel a live timer by id. Used when an occurrence arrives for a
    /// token with no backing record and only the live id is at hand.
    fn cancel_live(&self, timer_id: Uuid) -> bool;
}

/// In-process timer service: one tokio task per registered timer, sleeping
/// until the next occurrence and delivering events over an mpsc channel.
///
/// When the task wakes late (suspended process, long downstream call on the
/// same dispatch path) it delivers every occurrence due up to now, but all
/// except the most recent carry negative time-remaining. The engine drops
/// those, so a backlog never turns into a burst of calls.
pub struct TickTimerService {
    events: mpsc::Sender<OccurrenceEvent>,
    registry: Arc<DashMap<Uuid, watch::Sender<bool>>>,
}

impl TickTimerService {
    pub fn new(events: mpsc::Sender<OccurrenceEvent>) -> Self {
        Self {
            events,
            registry: Arc::new(DashMap::new()),
        }
    }
}

impl TimerService for TickTimerService {
    fn register_calendar_timer(
        &self,
        schedule: &Schedule,
        token: JobId,
        _persistent: bool,
    ) -> Result<TimerHandle> {
        let compiled = schedule.compiled()?;
        let timer_id = Uuid::new_v4();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        self.registry.insert(timer_id, cancel_tx);

        let events = self.events.clone();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(run_timer(
            compiled, token, timer_id, events, cancel_rx, registry,
        ));

        debug!(%timer_id, job_id = token, "calendar timer registered");
        Ok(TimerHandle {
            timer_id,
            token,
            schedule: schedule.clone(),
        })
    }

    fn resolve(&self, handle: &TimerHandle) -> bool {
        self.registry.contains_key(&handle.timer_id)
    }

    fn cancel(&self, handle: &TimerHandle) -> bool {
        self.cancel_live(handle.timer_id)
    }

    fn cancel_live(&self, timer_id: Uuid) -> bool {
        if let Some((_, cancel_tx)) = self.registry.remove(&timer_id) {
            let _ = cancel_tx.send(true);
            info!(%timer_id, "timer cancelled");
            true
        } else {
            false
        }
    }
}

async fn run_timer(
    schedule: cron::Schedule,
    token: JobId,
    timer_id: Uuid,
    events: mpsc::Sender<OccurrenceEvent>,
    mut cancel: watch::Receiver<bool>,
    registry: Arc<DashMap<Uuid, watch::Sender<bool>>>,
) {
    let mut armed = Utc::now();
    'outer: loop {
        // No next occurrence: the schedule is exhausted and the timer ends.
        let Some(next) = schedule.after(&armed).next() else {
            break;
        };
        let wait = (next - Utc::now()).to_std().unwrap_or_default();

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break 'outer;
                }
            }
        }

        // Deliver every occurrence due up to now. Only the most recent one
        // carries non-negative time-remaining; the rest are stale.
        let now = Utc::now();
        let mut fired = next;
        loop {
            let following = schedule.after(&fired).next();
            let time_remaining = match following {
                Some(f) => f - now,
                None => Duration::zero(),
            };
            let event = OccurrenceEvent {
                token,
                timer_id,
                time_remaining,
            };
            if events.send(event).await.is_err() {
                break 'outer;
            }
            match following {
                Some(f) if f <= now => fired = f,
                _ => {
                    armed = fired;
                    break;
                }
            }
        }
    }
    registry.remove(&timer_id);
}
