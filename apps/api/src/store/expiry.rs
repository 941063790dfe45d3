use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::errors::AppError;
use crate::store::DocumentStore;

/// Deletes every downloaded record older than `ttl` as of `now`.
pub async fn sweep_once(
    store: &dyn DocumentStore,
    ttl: Duration,
    now: DateTime<Utc>,
) -> Result<u64, AppError> {
    let removed = store.purge_expired(now - ttl).await?;
    if removed > 0 {
        info!(removed, "Expired downloaded documents purged");
    }
    Ok(removed)
}

/// Runs `sweep_once` on a fixed interval until the runtime shuts down.
pub fn spawn_sweeper(
    store: Arc<dyn DocumentStore>,
    ttl: Duration,
    every: StdDuration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_once(store.as_ref(), ttl, Utc::now()).await {
                error!("Expiry sweep failed: {e}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentModel, DocumentType};
    use crate::store::InMemoryDocumentStore;

    #[tokio::test]
    async fn test_sweep_respects_ttl() {
        let store = InMemoryDocumentStore::new();
        let record = store
            .upsert(DocumentModel::empty("u1", DocumentType::Cv))
            .await
            .unwrap();
        let downloaded_at = Utc::now();
        store.mark_downloaded(record.id, downloaded_at).await.unwrap();

        let ttl = Duration::hours(24);
        let removed = sweep_once(&store, ttl, downloaded_at + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = sweep_once(&store, ttl, downloaded_at + Duration::hours(25))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.fetch_by_id(record.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_on_interval() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let record = store
            .upsert(DocumentModel::empty("u1", DocumentType::Cv))
            .await
            .unwrap();
        store
            .mark_downloaded(record.id, Utc::now() - Duration::hours(48))
            .await
            .unwrap();

        let handle = spawn_sweeper(store.clone(), Duration::hours(24), StdDuration::from_secs(60));
        tokio::time::sleep(StdDuration::from_secs(1)).await;
        assert!(store.fetch_by_id(record.id).await.unwrap().is_none());
        handle.abort();
    }
}
