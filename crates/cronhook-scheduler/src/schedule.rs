use std::str::FromStr;

use chrono::{DateTime, Utc};
use cron::Schedule as CronSchedule;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// A seven-field calendar expression. `"*"` in a field means every value;
/// anything else is a cron-style field expression (single value, list,
/// range, or step).
///
/// Every field defaults to `"*"`. The schedule is a plain value — it is
/// validated eagerly when a job is created and is immutable once a timer
/// has been registered for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default = "star")]
    pub second: String,
    #[serde(default = "star")]
    pub minute: String,
    #[serde(default = "star")]
    pub hour: String,
    #[serde(default = "star")]
    pub day_of_month: String,
    #[serde(default = "star")]
    pub day_of_week: String,
    #[serde(default = "star")]
    pub month: String,
    #[serde(default = "star")]
    pub year: String,
}

fn star() -> String {
    "*".to_string()
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            second: star(),
            minute: star(),
            hour: star(),
            day_of_month: star(),
            day_of_week: star(),
            month: star(),
            year: star(),
        }
    }
}

impl Schedule {
    /// Field name, value, and its slot in the cron grammar
    /// (`sec min hour day-of-month month day-of-week year`).
    fn fields(&self) -> [(&'static str, &str, usize); 7] {
        [
            ("second", &self.second, 0),
            ("minute", &self.minute, 1),
            ("hour", &self.hour, 2),
            ("day_of_month", &self.day_of_month, 3),
            ("day_of_week", &self.day_of_week, 5),
            ("month", &self.month, 4),
            ("year", &self.year, 6),
        ]
    }

    /// Map the fields 1:1 into the cron grammar's slot order.
    pub fn to_cron_expression(&self) -> String {
        format!(
            "{} {} {} {} {} {} {}",
            self.second,
            self.minute,
            self.hour,
            self.day_of_month,
            self.month,
            self.day_of_week,
            self.year
        )
    }

    /// Validate every field against the calendar grammar, naming the first
    /// offending field. Each field is probed in an otherwise-wildcard
    /// expression so one bad field cannot be masked by another.
    pub fn validate(&self) -> Result<()> {
        for (field, value, slot) in self.fields() {
            if value == "*" {
                continue;
            }
            let mut parts = ["*"; 7];
            parts[slot] = value;
            let probe = parts.join(" ");
            if CronSchedule::from_str(&probe).is_err() {
                return Err(SchedulerError::InvalidScheduleField {
                    field,
                    value: value.to_string(),
                });
            }
        }
        // Cross-check the combined expression as the timer service sees it.
        self.compiled()?;
        Ok(())
    }

    pub(crate) fn compiled(&self) -> Result<CronSchedule> {
        CronSchedule::from_str(&self.to_cron_expression())
            .map_err(|e| SchedulerError::InvalidSchedule(e.to_string()))
    }

    /// Next occurrence strictly after `after`, or `None` when the schedule
    /// is exhausted or invalid.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.compiled().ok()?.after(&after).next()
    }
}
