use time::{Duration, OffsetDateTime};

/// How long a share stays retrievable after it is created.
pub const SHARE_TTL: Duration = Duration::hours(24);

/// A persisted pattern and sample pair, addressable by a short id until it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub id: String,
    pub pattern: String,
    pub sample: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Share {
    #[must_use]
    pub fn new(id: String, pattern: String, sample: String) -> Self {
        Self::new_at(id, pattern, sample, OffsetDateTime::now_utc())
    }

    /// Builds a share as if it had been created at `created_at`.
    #[must_use]
    pub fn new_at(id: String, pattern: String, sample: String, created_at: OffsetDateTime) -> Self {
        Self { id, pattern, sample, created_at, expires_at: created_at + SHARE_TTL }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }
}
