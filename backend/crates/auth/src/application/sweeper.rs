//! Expired Session Sweeper
//!
//! Periodic background task deleting sessions past their expiry.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::application::session_manager::SessionManager;
use crate::domain::repository::SessionRepository;

/// Spawn the sweeper loop
///
/// Runs every `every` until `shutdown` is cancelled. Failures are logged and
/// the loop carries on.
pub fn spawn_session_sweeper<S>(
    sessions: SessionManager<S>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    S: SessionRepository + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; startup runs its own sweep
        ticker.tick().await;

        tracing::info!(interval_secs = every.as_secs(), "Session sweeper started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = sessions.sweep_expired(Utc::now()).await {
                        tracing::error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }

        tracing::info!("Session sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::TimeDelta;

    use crate::application::config::AuthConfig;
    use crate::domain::entity::Session;
    use crate::infra::memory::InMemoryAuthRepository;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_survives_errors_and_stops_on_cancel() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user_id = repo
            .insert_user("alice", "alice@example.com", "password-123")
            .await;
        let expired = Utc::now() - TimeDelta::hours(1);
        repo.insert_session(Session::new("old".into(), user_id, expired, TimeDelta::zero()))
            .await;

        let sessions = SessionManager::new(repo.clone(), Arc::new(AuthConfig::development()));
        let shutdown = CancellationToken::new();
        let handle = spawn_session_sweeper(sessions, Duration::from_secs(60), shutdown.clone());

        // First run fails
        repo.set_failing(true);
        tokio::time::sleep(Duration::from_secs(61)).await;
        repo.set_failing(false);
        assert_eq!(repo.session_count().await, 1);

        // Next run succeeds
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(repo.session_count().await, 0);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
