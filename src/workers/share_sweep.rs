use crate::adapters::storage::ShareStore;
use crate::error::Result;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::Instrument;

#[derive(Clone, Debug)]
struct Metrics {
    deleted: Counter<u64>,
    errors: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("regexlab-server");
        Self {
            deleted: meter
                .u64_counter("regexlab_sweep_deleted_total")
                .with_description("Total expired shares removed by the background sweep")
                .build(),
            errors: meter
                .u64_counter("regexlab_sweep_errors_total")
                .with_description("Total sweep passes that failed")
                .build(),
        }
    }
}

/// Periodically removes expired shares that nobody has looked up.
#[derive(Debug)]
pub struct ShareSweepWorker {
    store: Arc<dyn ShareStore>,
    interval: Duration,
    metrics: Metrics,
}

impl ShareSweepWorker {
    #[must_use]
    pub fn new(store: Arc<dyn ShareStore>, interval: Duration) -> Self {
        Self { store, interval, metrics: Metrics::new() }
    }

    pub async fn run(self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        let mut interval = self.ticker();

        while !*shutdown.borrow() {
            tokio::select! {
                _ = interval.tick() => {
                    // A failed pass only means expired shares linger until the next one.
                    if let Err(e) = self.perform_sweep()
                        .instrument(tracing::info_span!("share_sweep_iteration"))
                        .await
                    {
                        tracing::error!(error = %e, "Share sweep failed");
                        self.metrics.errors.add(1, &[]);
                    }
                }
                _ = shutdown.changed() => {}
            }
        }
        tracing::info!("Share sweep loop shutting down...");
    }

    /// A pass that overruns its period pushes the schedule back instead of firing catch-up sweeps.
    fn ticker(&self) -> Interval {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Runs a single sweep pass.
    ///
    /// # Errors
    /// Returns an error if the storage directory cannot be listed.
    #[tracing::instrument(skip(self), err, fields(deleted = tracing::field::Empty))]
    pub async fn perform_sweep(&self) -> Result<u64> {
        tracing::debug!("Sweeping expired shares...");

        let count = self.store.sweep_expired().await?;
        if count > 0 {
            tracing::info!(count = %count, "Deleted expired shares");
            tracing::Span::current().record("deleted", count);
            self.metrics.deleted.add(count, &[]);
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::FileShareStore;
    use crate::domain::share::{SHARE_TTL, Share};
    use time::OffsetDateTime;

    async fn seeded_store() -> (tempfile::TempDir, Arc<FileShareStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileShareStore::open(dir.path()).await.unwrap());
        let old = OffsetDateTime::now_utc() - SHARE_TTL - time::Duration::hours(1);

        store.save(&Share::new_at("expired1".into(), "a".into(), "a".into(), old)).await.unwrap();
        store.save(&Share::new_at("expired2".into(), "b".into(), "b".into(), old)).await.unwrap();
        store.save(&Share::new("fresh001".into(), "c".into(), "c".into())).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_perform_sweep() {
        let (dir, store) = seeded_store().await;
        let worker = ShareSweepWorker::new(store, Duration::from_secs(3600));

        assert_eq!(worker.perform_sweep().await.unwrap(), 2);
        assert_eq!(worker.perform_sweep().await.unwrap(), 0);
        assert!(dir.path().join("fresh001.json").exists());
    }

    #[tokio::test]
    async fn test_overrun_delays_the_schedule() {
        let (_dir, store) = seeded_store().await;
        let worker = ShareSweepWorker::new(store, Duration::from_secs(3600));

        let interval = worker.ticker();

        assert_eq!(interval.missed_tick_behavior(), MissedTickBehavior::Delay);
        assert_eq!(interval.period(), Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_perform_sweep_reports_listing_failure() {
        let (dir, store) = seeded_store().await;
        let worker = ShareSweepWorker::new(store, Duration::from_secs(3600));
        std::fs::remove_dir_all(dir.path()).unwrap();

        assert!(worker.perform_sweep().await.is_err());
    }

    #[tokio::test]
    async fn test_run_sweeps_and_stops_on_shutdown() {
        let (dir, store) = seeded_store().await;
        let worker = ShareSweepWorker::new(store, Duration::from_millis(20));
        let (tx, rx) = tokio::sync::watch::channel(false);

        let handle = tokio::spawn(worker.run(rx));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!dir.path().join("expired1.json").exists());
        assert!(!dir.path().join("expired2.json").exists());
        assert!(dir.path().join("fresh001.json").exists());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_run_survives_failed_passes() {
        let (dir, store) = seeded_store().await;
        let worker = ShareSweepWorker::new(Arc::clone(&store) as Arc<dyn ShareStore>, Duration::from_millis(10));
        std::fs::remove_dir_all(dir.path()).unwrap();
        let (tx, rx) = tokio::sync::watch::channel(false);

        let handle = tokio::spawn(worker.run(rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        std::fs::create_dir_all(dir.path()).unwrap();
        let old = OffsetDateTime::now_utc() - SHARE_TTL - time::Duration::hours(1);
        store.save(&Share::new_at("expired3".into(), "a".into(), "a".into(), old)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!dir.path().join("expired3.json").exists());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
