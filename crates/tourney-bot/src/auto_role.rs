//! Recurring role assignment.
//!
//! A job descriptor names how often to run, which members qualify, and the
//! role to give them. The scheduler owns at most one running job: configuring
//! a new one stops the old one first, and [`AutoRoleScheduler::stop`] must be
//! called on shutdown.
//!
//! Deciding who matches `criterion` and actually granting the role belong to
//! the chat platform, behind [`RoleAssigner`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors raised when configuring a job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AutoRoleError {
    #[error("interval must be at least 1 second")]
    ZeroInterval,
}

/// Describes one recurring role-assignment job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoRoleJob {
    /// Seconds between runs. The first run happens immediately.
    pub interval_seconds: u64,
    /// Platform-defined rule selecting which members get the role.
    pub criterion: String,
    /// Role granted to matching members.
    pub target_role: String,
}

/// Grants roles on the chat platform.
pub trait RoleAssigner: Send + Sync {
    /// Gives `role` to every member matching `criterion`, returning how many
    /// members were changed.
    fn assign(&self, criterion: &str, role: &str) -> Result<usize, String>;
}

/// Assigner for environments without a platform connection. Only logs.
#[derive(Debug, Default)]
pub struct LoggingAssigner;

impl RoleAssigner for LoggingAssigner {
    fn assign(&self, criterion: &str, role: &str) -> Result<usize, String> {
        tracing::info!("Would assign role '{}' to members matching '{}'", role, criterion);
        Ok(0)
    }
}

struct RunningJob {
    job: AutoRoleJob,
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the lifecycle of the (single) auto-role job.
#[derive(Default)]
pub struct AutoRoleScheduler {
    running: Option<RunningJob>,
}

impl AutoRoleScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `job`, replacing any job already running.
    ///
    /// # Errors
    ///
    /// Returns [`AutoRoleError::ZeroInterval`] for a zero interval; a job that
    /// was already running keeps running in that case.
    pub async fn configure(
        &mut self,
        job: AutoRoleJob,
        assigner: Arc<dyn RoleAssigner>,
    ) -> Result<(), AutoRoleError> {
        if job.interval_seconds == 0 {
            return Err(AutoRoleError::ZeroInterval);
        }
        self.stop().await;

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = Duration::from_secs(job.interval_seconds);
        let criterion = job.criterion.clone();
        let role = job.target_role.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match assigner.assign(&criterion, &role) {
                            Ok(count) => tracing::info!(
                                "Auto-role '{}' assigned to {} members",
                                role,
                                count
                            ),
                            Err(e) => tracing::warn!("Auto-role '{}' failed: {}", role, e),
                        }
                    }
                    // Fires on an explicit stop and when the sender is dropped.
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        tracing::info!(
            "Auto-role job started: every {}s, '{}' -> '{}'",
            job.interval_seconds,
            job.criterion,
            job.target_role
        );
        self.running = Some(RunningJob {
            job,
            shutdown,
            handle,
        });
        Ok(())
    }

    /// Stops the running job and waits for it to finish.
    ///
    /// Returns the descriptor of the job that was stopped, if any.
    pub async fn stop(&mut self) -> Option<AutoRoleJob> {
        let running = self.running.take()?;
        let _ = running.shutdown.send(true);
        if let Err(e) = running.handle.await {
            tracing::warn!("Auto-role task ended abnormally: {}", e);
        }
        tracing::info!("Auto-role job '{}' stopped", running.job.target_role);
        Some(running.job)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The job currently scheduled.
    #[must_use]
    pub fn current(&self) -> Option<&AutoRoleJob> {
        self.running.as_ref().map(|running| &running.job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingAssigner {
        calls: AtomicUsize,
    }

    impl RoleAssigner for CountingAssigner {
        fn assign(&self, _criterion: &str, _role: &str) -> Result<usize, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        }
    }

    fn job(interval_seconds: u64, role: &str) -> AutoRoleJob {
        AutoRoleJob {
            interval_seconds,
            criterion: "has_team".to_string(),
            target_role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_configure_runs_immediately_and_stop_halts() {
        let assigner = Arc::new(CountingAssigner::default());
        let mut scheduler = AutoRoleScheduler::new();

        scheduler
            .configure(job(3600, "Competitor"), assigner.clone())
            .await
            .unwrap();
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(assigner.calls.load(Ordering::SeqCst), 1);

        let stopped = scheduler.stop().await;
        assert_eq!(stopped, Some(job(3600, "Competitor")));
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(assigner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconfigure_replaces_job() {
        let assigner: Arc<dyn RoleAssigner> = Arc::new(LoggingAssigner);
        let mut scheduler = AutoRoleScheduler::new();

        scheduler
            .configure(job(60, "Old"), assigner.clone())
            .await
            .unwrap();
        scheduler
            .configure(job(120, "New"), assigner)
            .await
            .unwrap();

        assert_eq!(scheduler.current(), Some(&job(120, "New")));
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_zero_interval_keeps_existing_job() {
        let assigner: Arc<dyn RoleAssigner> = Arc::new(LoggingAssigner);
        let mut scheduler = AutoRoleScheduler::new();
        scheduler
            .configure(job(60, "Keep"), assigner.clone())
            .await
            .unwrap();

        assert_eq!(
            scheduler.configure(job(0, "Bad"), assigner).await,
            Err(AutoRoleError::ZeroInterval)
        );
        assert_eq!(scheduler.current(), Some(&job(60, "Keep")));
        scheduler.stop().await;
    }

    #[tokio::test]
    async fn test_stop_without_job() {
        let mut scheduler = AutoRoleScheduler::new();
        assert_eq!(scheduler.stop().await, None);
    }
}
