//! TTL expiration sweeper

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ReportRepository;

/// Spawn the periodic expiration sweep.
///
/// One sweeper per process; the first sweep runs immediately, then every
/// `interval`. Abort the returned handle to stop it. Not started at all when
/// the process runs without a repository.
pub fn spawn_sweeper(
    repository: Arc<dyn ReportRepository>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match repository.delete_expired().await {
                Ok(0) => debug!("expiration sweep found nothing to remove"),
                Ok(removed) => info!(removed, "expiration sweep removed expired reports"),
                Err(error) => warn!(%error, "expiration sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{CreateReportParams, MemoryReportRepository};

    #[tokio::test]
    async fn test_sweeper_removes_expired_records() {
        let repository = Arc::new(MemoryReportRepository::new());
        let record = repository
            .create(CreateReportParams {
                title: "ephemeral".to_string(),
                content: b"{}".to_vec(),
                content_type: "application/json".to_string(),
                filename: "ephemeral.json".to_string(),
                ttl_seconds: 1,
                ..Default::default()
            })
            .await
            .unwrap();

        let handle = spawn_sweeper(
            repository.clone() as Arc<dyn ReportRepository>,
            Duration::from_millis(200),
        );
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.abort();

        assert!(repository.get(record.id).await.is_err());
        assert_eq!(repository.raw_len(), 0);
    }
}
