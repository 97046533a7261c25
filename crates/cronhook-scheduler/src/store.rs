use std::sync::Mutex;

use rusqlite::Connection;

use cronhook_core::{BasicAuth, CookiePair, RequestSpec};

use crate::db::init_db;
use crate::error::{Result, SchedulerError};
use crate::schedule::Schedule;
use crate::types::{Job, JobId};

/// The durable store consumed by the engine.
pub trait JobStore: Send + Sync {
    fn find_job(&self, id: JobId) -> Result<Option<Job>>;
    /// Insert a job, honouring a pre-assigned identity when present.
    /// Returns the (possibly store-assigned) identity.
    fn insert_job(&self, job: &Job) -> Result<JobId>;
    fn update_job(&self, job: &Job) -> Result<()>;
    /// Returns `true` when a record was deleted.
    fn delete_job(&self, id: JobId) -> Result<bool>;
    fn list_jobs(&self) -> Result<Vec<Job>>;
}

const JOB_COLUMNS: &str = "id, method, url, cookie_name, cookie_content, \
     basic_auth_username, basic_auth_password, \
     second, minute, hour, day_of_month, day_of_week, month, year, \
     timer_handle, active";

/// SQLite-backed job store.
///
/// Thread-safe: wraps the connection in a Mutex; statement work is short
/// enough that contention is not a concern at this scale.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Wrap `conn`, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<Job> {
    let cookie_name: Option<String> = row.get(3)?;
    let cookie_content: Option<String> = row.get(4)?;
    let username: Option<String> = row.get(5)?;
    let password: Option<String> = row.get(6)?;

    let mut request = RequestSpec::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?);
    request.cookie = cookie_name.map(|name| CookiePair {
        name,
        content: cookie_content.unwrap_or_default(),
    });
    request.basic_auth = username.map(|username| BasicAuth {
        username,
        password: password.unwrap_or_default(),
    });

    Ok(Job {
        id: Some(row.get(0)?),
        request,
        schedule: Schedule {
            second: row.get(7)?,
            minute: row.get(8)?,
            hour: row.get(9)?,
            day_of_month: row.get(10)?,
            day_of_week: row.get(11)?,
            month: row.get(12)?,
            year: row.get(13)?,
        },
        timer_handle: row.get(14)?,
        active: row.get::<_, i64>(15)? != 0,
    })
}

impl JobStore for SqliteJobStore {
    fn find_job(&self, id: JobId) -> Result<Option<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare_cached(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"))?;
        match stmt.query_row([id], row_to_job) {
            Ok(job) => Ok(Some(job)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn insert_job(&self, job: &Job) -> Result<JobId> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO jobs (id, method, url, cookie_name, cookie_content,
                 basic_auth_username, basic_auth_password,
                 second, minute, hour, day_of_month, day_of_week, month, year,
                 timer_handle, active)
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16)",
            rusqlite::params![
                job.id,
                job.request.method,
                job.request.url,
                job.request.cookie.as_ref().map(|c| c.name.as_str()),
                job.request.cookie.as_ref().map(|c| c.content.as_str()),
                job.request.basic_auth.as_ref().map(|a| a.username.as_str()),
                job.request.basic_auth.as_ref().map(|a| a.password.as_str()),
                job.schedule.second,
                job.schedule.minute,
                job.schedule.hour,
                job.schedule.day_of_month,
                job.schedule.day_of_week,
                job.schedule.month,
                job.schedule.year,
                job.timer_handle,
                job.active,
            ],
        )?;
        Ok(job.id.unwrap_or_else(|| conn.last_insert_rowid()))
    }

    fn update_job(&self, job: &Job) -> Result<()> {
        let Some(id) = job.id else {
            return Err(SchedulerError::Unidentified);
        };
        let conn = self.conn.lock().unwrap();
        let n = conn.execute(
            "UPDATE jobs SET method=?1, url=?2, cookie_name=?3, cookie_content=?4,
                 basic_auth_username=?5, basic_auth_password=?6,
                 second=?7, minute=?8, hour=?9, day_of_month=?10, day_of_week=?11,
                 month=?12, year=?13, timer_handle=?14, active=?15
             WHERE id=?16",
            rusqlite::params![
                job.request.method,
                job.request.url,
                job.request.cookie.as_ref().map(|c| c.name.as_str()),
                job.request.cookie.as_ref().map(|c| c.content.as_str()),
                job.request.basic_auth.as_ref().map(|a| a.username.as_str()),
                job.request.basic_auth.as_ref().map(|a| a.password.as_str()),
                job.schedule.second,
                job.schedule.minute,
                job.schedule.hour,
                job.schedule.day_of_month,
                job.schedule.day_of_week,
                job.schedule.month,
                job.schedule.year,
                job.timer_handle,
                job.active,
                id,
            ],
        )?;
        if n == 0 {
            return Err(SchedulerError::JobNotFound { id });
        }
        Ok(())
    }

    fn delete_job(&self, id: JobId) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM jobs WHERE id = ?1", [id])?;
        Ok(n > 0)
    }

    fn list_jobs(&self) -> Result<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached(&format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY id"))?;
        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(jobs)
    }
}
