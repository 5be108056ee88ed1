//! In-process delayed jobs backed by tokio timers

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::errors::SchedulerError;
use crate::domain::traits::{Job, JobId, TaskScheduler};

/// Runs jobs when they come due
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn run(&self, job: Job);
}

/// Each job sleeps in its own task until due. Jobs do not survive a restart.
pub struct TokioScheduler {
    runner: Arc<dyn JobRunner>,
    pending: Arc<Mutex<HashMap<JobId, JoinHandle<()>>>>,
}

impl TokioScheduler {
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self {
            runner,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl TaskScheduler for TokioScheduler {
    fn schedule(&self, job: Job) -> Result<JobId, SchedulerError> {
        if job.name.is_empty() {
            return Err(SchedulerError::InvalidJob("job name is empty".to_string()));
        }

        let id = JobId(Uuid::new_v4());
        // Past-due jobs run right away
        let delay = (job.run_at - Utc::now()).to_std().unwrap_or_default();
        let runner = Arc::clone(&self.runner);
        let pending = Arc::clone(&self.pending);

        let mut guard = self.pending.lock().map_err(|_| SchedulerError::Closed)?;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Ok(mut pending) = pending.lock() {
                pending.remove(&id);
            }
            tracing::debug!(job = %job.name, id = %id, "Running scheduled job");
            runner.run(job).await;
        });
        guard.insert(id, handle);
        Ok(id)
    }

    fn cancel(&self, id: &JobId) -> bool {
        let handle = self.pending.lock().ok().and_then(|mut p| p.remove(id));
        match handle {
            Some(handle) => {
                handle.abort();
                tracing::debug!(id = %id, "Cancelled scheduled job");
                true
            }
            None => false,
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, handle) in pending.drain() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    struct ChannelRunner(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl JobRunner for ChannelRunner {
        async fn run(&self, job: Job) {
            let _ = self.0.send(job.name);
        }
    }

    fn scheduler() -> (TokioScheduler, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (TokioScheduler::new(Arc::new(ChannelRunner(tx))), rx)
    }

    #[tokio::test]
    async fn test_job_runs_when_due() {
        let (scheduler, mut rx) = scheduler();
        let run_at = Utc::now() + chrono::Duration::milliseconds(20);
        scheduler
            .schedule(Job::new("remind", run_at, serde_json::Value::Null))
            .unwrap();

        let name = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(name, "remind");
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_job_never_runs() {
        let (scheduler, mut rx) = scheduler();
        let run_at = Utc::now() + chrono::Duration::milliseconds(50);
        let id = scheduler
            .schedule(Job::new("remind", run_at, serde_json::Value::Null))
            .unwrap();

        assert!(scheduler.cancel(&id));
        assert!(!scheduler.cancel(&id));

        let got = tokio::time::timeout(Duration::from_millis(150), rx.recv()).await;
        assert!(got.is_err());
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let (scheduler, _rx) = scheduler();
        let err = scheduler
            .schedule(Job::new("", Utc::now(), serde_json::Value::Null))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidJob(_)));
    }
}
