use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::errors::SchedulerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unit of delayed work
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    pub run_at: DateTime<Utc>,
    pub data: serde_json::Value,
}

impl Job {
    pub fn new(name: impl Into<String>, run_at: DateTime<Utc>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            run_at,
            data,
        }
    }
}

/// Enqueue and cancel delayed jobs. How jobs are stored and woken is up to
/// the implementation.
pub trait TaskScheduler: Send + Sync {
    fn schedule(&self, job: Job) -> Result<JobId, SchedulerError>;

    /// False if the job already ran or was never scheduled
    fn cancel(&self, id: &JobId) -> bool;
}
