use crate::adapters::storage::ShareStore;
use crate::adapters::storage::records::ShareRecord;
use crate::domain::share::Share;
use crate::domain::share_id;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use opentelemetry::{global, metrics::Counter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use tokio::sync::RwLock;

const EXTENSION: &str = "json";
const STAGING_SUFFIX: &str = ".json.tmp";

#[derive(Clone, Debug)]
struct Metrics {
    expired_on_read: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("regexlab-server");
        Self {
            expired_on_read: meter
                .u64_counter("regexlab_shares_expired_on_read_total")
                .with_description("Total shares evicted because they had expired when looked up")
                .build(),
        }
    }
}

/// Stores each share as `<id>.json` inside a single directory.
///
/// Saves stage through `<id>.json.tmp`; the sweep collects staging files left behind by a crash.
/// Saves and sweeps hold the lock exclusively; lookups share it. A lookup that finds an
/// expired share removes the file while holding only the shared lock, which races benignly
/// with a concurrent sweep because removing a missing file is not an error.
#[derive(Debug)]
pub struct FileShareStore {
    dir: PathBuf,
    lock: RwLock<()>,
    metrics: Metrics,
}

impl FileShareStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns `AppError::Io` if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Share store opened");
        Ok(Self { dir, lock: RwLock::new(()), metrics: Metrics::new() })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }
}

/// Reads and decodes a share file. Missing, unreadable and malformed files all yield `None`.
async fn read_share(path: &Path) -> Option<Share> {
    let data = fs::read(path).await.ok()?;
    serde_json::from_slice::<ShareRecord>(&data).ok().map(Share::from)
}

async fn remove_if_present(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl ShareStore for FileShareStore {
    #[tracing::instrument(level = "debug", skip(self, share), fields(share_id = %share.id), err)]
    async fn save(&self, share: &Share) -> Result<()> {
        let data = serde_json::to_vec(&ShareRecord::from(share))?;
        let path = self.path_for(&share.id);
        let staging = self.dir.join(format!("{}{STAGING_SUFFIX}", share.id));

        let _guard = self.lock.write().await;
        fs::create_dir_all(&self.dir).await?;
        fs::write(&staging, &data).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e.into());
        }

        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn find_by_id(&self, id: &str) -> Result<Share> {
        if !share_id::is_well_formed(id) {
            return Err(AppError::NotFound);
        }
        let path = self.path_for(id);

        let _guard = self.lock.read().await;
        let share = read_share(&path).await.ok_or(AppError::NotFound)?;

        if share.is_expired_at(OffsetDateTime::now_utc()) {
            if let Err(e) = remove_if_present(&path).await {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove expired share");
            }
            self.metrics.expired_on_read.add(1, &[]);
            return Err(AppError::NotFound);
        }

        Ok(share)
    }

    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn sweep_expired(&self) -> Result<u64> {
        let _guard = self.lock.write().await;
        let now = OffsetDateTime::now_utc();
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut deleted = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            // No save is in flight under the exclusive lock, so any staging file is a leftover
            if path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(STAGING_SUFFIX)) {
                if let Err(e) = remove_if_present(&path).await {
                    tracing::debug!(error = %e, path = %path.display(), "Failed to remove stale staging file");
                }
                continue;
            }

            if path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }

            // Corruption is not evidence of expiry
            let Some(share) = read_share(&path).await else {
                tracing::debug!(path = %path.display(), "Skipping unreadable share file");
                continue;
            };

            if share.is_expired_at(now) {
                match remove_if_present(&path).await {
                    Ok(true) => deleted += 1,
                    Ok(false) => {}
                    Err(e) => tracing::debug!(error = %e, path = %path.display(), "Failed to remove expired share"),
                }
            }
        }

        Ok(deleted)
    }

    async fn check(&self) -> Result<()> {
        let meta = fs::metadata(&self.dir).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(AppError::Io(std::io::Error::other("storage path is not a directory")))
        }
    }
}
