//! Scheduled batch jobs run by the `worker` binary.
//!
//! Each job walks active users one at a time without a shared transaction and
//! records the outcome per user, so one failing user never stops the batch.

pub mod runner;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use uuid::Uuid;

pub use runner::JobRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    OverdueSweep,
    DailyReminders,
    WeeklyCoaching,
    TaskGeneration,
}

impl Job {
    pub const ALL: [Job; 4] = [
        Job::OverdueSweep,
        Job::DailyReminders,
        Job::WeeklyCoaching,
        Job::TaskGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Job::OverdueSweep => "overdue-sweep",
            Job::DailyReminders => "daily-reminders",
            Job::WeeklyCoaching => "weekly-coaching",
            Job::TaskGeneration => "task-generation",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Job {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Job::ALL
            .iter()
            .find(|job| job.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let names: Vec<&str> = Job::ALL.iter().map(|j| j.as_str()).collect();
                format!("unknown job '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Per-user outcomes of one job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub job: Job,
    pub succeeded: Vec<Uuid>,
    pub skipped: Vec<Uuid>,
    pub failed: Vec<(Uuid, String)>,
}

impl BatchReport {
    pub fn new(job: Job) -> Self {
        Self {
            job,
            succeeded: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn success(&mut self, user_id: Uuid) {
        self.succeeded.push(user_id);
    }

    pub fn skip(&mut self, user_id: Uuid) {
        self.skipped.push(user_id);
    }

    pub fn failure(&mut self, user_id: Uuid, error: impl fmt::Display) {
        tracing::warn!(job = %self.job, user_id = %user_id, error = %error, "Job failed for user");
        self.failed.push((user_id, error.to_string()));
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Every attempted user failed.
    pub fn is_total_failure(&self) -> bool {
        !self.failed.is_empty() && self.succeeded.is_empty()
    }

    pub fn log(&self) {
        if self.is_total_failure() {
            tracing::error!(
                job = %self.job,
                failed = self.failed.len(),
                "Job failed for every user, will retry on the next run"
            );
        } else {
            tracing::info!(
                job = %self.job,
                succeeded = self.succeeded.len(),
                skipped = self.skipped.len(),
                failed = self.failed.len(),
                "Job finished"
            );
        }
    }
}

/// Next instant strictly after `now` at `hour`:00 UTC, optionally restricted
/// to one weekday.
pub fn next_run(now: DateTime<Utc>, hour: u32, weekday: Option<Weekday>) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let mut candidate = now.date_naive().and_time(at).and_utc();
    if candidate <= now {
        candidate += Duration::days(1);
    }
    if let Some(weekday) = weekday {
        while candidate.weekday() != weekday {
            candidate += Duration::days(1);
        }
    }
    candidate
}
