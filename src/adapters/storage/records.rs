use crate::domain::share::Share;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// On-disk form of a [`Share`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub(crate) id: String,
    pub(crate) pattern: String,
    pub(crate) test_string: String,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub(crate) expires_at: OffsetDateTime,
}

impl From<&Share> for ShareRecord {
    fn from(share: &Share) -> Self {
        Self {
            id: share.id.clone(),
            pattern: share.pattern.clone(),
            test_string: share.sample.clone(),
            created_at: share.created_at,
            expires_at: share.expires_at,
        }
    }
}

impl From<ShareRecord> for Share {
    fn from(record: ShareRecord) -> Self {
        Self {
            id: record.id,
            pattern: record.pattern,
            sample: record.test_string,
            created_at: record.created_at,
            expires_at: record.expires_at,
        }
    }
}
