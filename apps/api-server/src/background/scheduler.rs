//! Cron-style job scheduler using tokio-cron-scheduler.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use cattery_core::ports::SessionRepository;

use crate::config::env_flag;

/// Top of every hour (sec min hour day month weekday).
const DEFAULT_PURGE_SCHEDULE: &str = "0 0 * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
    /// Cron expression for the expired-session purge.
    pub session_purge_cron: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            session_purge_cron: DEFAULT_PURGE_SCHEDULE.to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("SCHEDULER_ENABLED", true),
            session_purge_cron: std::env::var("SESSION_PURGE_CRON")
                .unwrap_or_else(|_| DEFAULT_PURGE_SCHEDULE.to_string()),
        }
    }
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new() -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner })
    }

    /// Add a cron job.
    ///
    /// # Example
    /// ```ignore
    /// scheduler.add_cron("0 0 * * * *", || async {
    ///     tracing::info!("Running hourly job");
    /// }).await?;
    /// ```
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Delete every session that has expired. Returns how many were removed.
pub async fn purge_expired_sessions(sessions: &dyn SessionRepository) -> u64 {
    match sessions.purge_expired(Utc::now()).await {
        Ok(0) => 0,
        Ok(removed) => {
            tracing::info!(removed, "Purged expired sessions");
            removed
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to purge expired sessions");
            0
        }
    }
}

/// Build and start a scheduler running the expired-session purge.
///
/// Returns `None` when scheduling is disabled.
pub async fn start_session_purge(
    config: &SchedulerConfig,
    sessions: Arc<dyn SessionRepository>,
) -> Result<Option<Scheduler>, JobSchedulerError> {
    if !config.enabled {
        tracing::info!("Scheduler disabled; expired sessions are only removed on lookup");
        return Ok(None);
    }

    let scheduler = Scheduler::new().await?;
    scheduler
        .add_cron(&config.session_purge_cron, move || {
            let sessions = sessions.clone();
            async move {
                purge_expired_sessions(sessions.as_ref()).await;
            }
        })
        .await?;
    scheduler.start().await?;

    Ok(Some(scheduler))
}
