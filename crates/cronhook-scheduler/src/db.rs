use rusqlite::Connection;

use crate::error::Result;

/// Initialise the scheduler schema in `conn` (idempotent).
///
/// `jobs` is the durable job record; `executions` is the audit trail written
/// by the dispatching executor, one row per fired occurrence that reached
/// dispatch.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS jobs (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            method              TEXT NOT NULL CHECK (length(method) <= 10),
            url                 TEXT NOT NULL CHECK (length(url) <= 2048),
            cookie_name         TEXT CHECK (length(cookie_name) <= 255),
            cookie_content      TEXT CHECK (length(cookie_content) <= 4096),
            basic_auth_username TEXT CHECK (length(basic_auth_username) <= 255),
            basic_auth_password TEXT CHECK (length(basic_auth_password) <= 255),
            second              TEXT NOT NULL DEFAULT '*' CHECK (length(second) <= 255),
            minute              TEXT NOT NULL DEFAULT '*' CHECK (length(minute) <= 255),
            hour                TEXT NOT NULL DEFAULT '*' CHECK (length(hour) <= 255),
            day_of_month        TEXT NOT NULL DEFAULT '*' CHECK (length(day_of_month) <= 255),
            day_of_week         TEXT NOT NULL DEFAULT '*' CHECK (length(day_of_week) <= 255),
            month               TEXT NOT NULL DEFAULT '*' CHECK (length(month) <= 255),
            year                TEXT NOT NULL DEFAULT '*' CHECK (length(year) <= 255),
            timer_handle        BLOB,               -- NULL until creation completes
            active              INTEGER NOT NULL DEFAULT 1
        ) STRICT;

        CREATE TABLE IF NOT EXISTS executions (
            id          TEXT NOT NULL PRIMARY KEY,
            job_id      INTEGER NOT NULL,
            started_at  TEXT NOT NULL,              -- ISO-8601
            finished_at TEXT,
            outcome     TEXT,                       -- success | http-error | transport-error | unsupported-method
            status_code INTEGER,
            error       TEXT
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_executions_job ON executions (job_id);
        ",
    )?;
    Ok(())
}
