//! `cronhook-scheduler` — durable calendar scheduling for HTTP call jobs.
//!
//! # Overview
//!
//! A [`types::Job`] couples an HTTP request spec with a seven-field
//! [`schedule::Schedule`] and is persisted to a SQLite `jobs` table together
//! with an opaque, serialized reference to its live timer. The
//! [`engine::SchedulerEngine`] is purely reactive: the timer service delivers
//! one [`timer::OccurrenceEvent`] per firing and the engine decides whether
//! the occurrence executes, is skipped, or cancels an orphaned timer.
//!
//! # Engine operations
//!
//! | Operation           | Behaviour                                              |
//! |---------------------|--------------------------------------------------------|
//! | `create_job`        | Validate, persist, register timer, store its handle    |
//! | `remove_job`        | Idempotent delete + timer cancel                       |
//! | `handle_occurrence` | Skip stale/inactive, clean up orphans, or dispatch once |
//! | `restore_jobs`      | Re-arm timers for persisted jobs after a restart       |

pub mod db;
pub mod engine;
pub mod error;
pub mod executor;
pub mod handle;
pub mod schedule;
pub mod store;
pub mod timer;
pub mod types;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use executor::{DispatchingExecutor, JobExecution, JobExecutor};
pub use schedule::Schedule;
pub use store::{JobStore, SqliteJobStore};
pub use timer::{OccurrenceEvent, TickTimerService, TimerHandle, TimerService};
pub use types::{Job, JobId};
