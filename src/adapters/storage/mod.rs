use crate::domain::share::Share;
use crate::error::Result;
use async_trait::async_trait;

pub mod file;
pub mod records;

pub use file::FileShareStore;

/// Persistence for shares with TTL eviction.
///
/// Lookups of expired, missing and unreadable shares all fail with `AppError::NotFound`.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Persists `share`, replacing any share stored under the same id.
    async fn save(&self, share: &Share) -> Result<()>;

    /// Returns the live share stored under `id`, evicting it if it has expired.
    async fn find_by_id(&self, id: &str) -> Result<Share>;

    /// Removes every expired share and returns how many were removed.
    async fn sweep_expired(&self) -> Result<u64>;

    /// Confirms the backing storage is reachable.
    async fn check(&self) -> Result<()>;
}
