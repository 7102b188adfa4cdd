use crate::adapters::storage::ShareStore;
use crate::domain::share::Share;
use crate::domain::share_id::IdGenerator;
use crate::error::Result;
use crate::services::regex_service::RegexService;
use opentelemetry::{global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    created: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("regexlab-server");
        Self {
            created: meter
                .u64_counter("regexlab_shares_created_total")
                .with_description("Total shares persisted")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShareService {
    store: Arc<dyn ShareStore>,
    ids: Arc<dyn IdGenerator>,
    regex: RegexService,
    metrics: Metrics,
}

impl ShareService {
    #[must_use]
    pub fn new(store: Arc<dyn ShareStore>, ids: Arc<dyn IdGenerator>, regex: RegexService) -> Self {
        Self { store, ids, regex, metrics: Metrics::new() }
    }

    /// Validates `pattern` and persists it together with `sample` under a fresh id.
    ///
    /// # Errors
    /// Returns `AppError::InvalidPattern` if the pattern does not compile.
    /// Returns `AppError::Io` or `AppError::Serialization` if the share cannot be written.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, pattern, sample),
        fields(share_id = tracing::field::Empty)
    )]
    pub async fn share(&self, pattern: String, sample: String) -> Result<Share> {
        self.regex.compile(&pattern)?;

        let share = Share::new(self.ids.generate(), pattern, sample);
        tracing::Span::current().record("share_id", share.id.as_str());

        self.store.save(&share).await?;
        self.metrics.created.add(1, &[]);

        tracing::debug!(expires_at = %share.expires_at, "Share created");
        Ok(share)
    }

    /// Looks up a live share.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the share is missing, expired or unreadable.
    #[tracing::instrument(err(level = "debug"), skip(self))]
    pub async fn retrieve(&self, id: &str) -> Result<Share> {
        self.store.find_by_id(id).await
    }
}
