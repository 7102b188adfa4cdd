use crate::config::RegexConfig;
use crate::error::{AppError, Result};
use regex::{Regex, RegexBuilder};

/// Compiles and runs user-supplied patterns.
#[derive(Clone, Debug)]
pub struct RegexService {
    config: RegexConfig,
}

impl RegexService {
    #[must_use]
    pub const fn new(config: RegexConfig) -> Self {
        Self { config }
    }

    /// Compiles `pattern`, bounded by the configured size limit.
    ///
    /// # Errors
    /// Returns `AppError::InvalidPattern` carrying the compiler's message if the pattern is rejected.
    pub fn compile(&self, pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern)
            .size_limit(self.config.size_limit)
            .build()
            .map_err(|e| AppError::InvalidPattern(e.to_string()))
    }

    #[must_use]
    pub fn validate(&self, pattern: &str) -> bool {
        self.compile(pattern).is_ok()
    }

    /// Returns every non-overlapping match of `pattern` in `sample`, left to right.
    ///
    /// # Errors
    /// Returns `AppError::InvalidPattern` if the pattern does not compile.
    #[tracing::instrument(level = "debug", skip(self, sample), fields(sample_len = sample.len()), err(level = "debug"))]
    pub fn find_matches(&self, pattern: &str, sample: &str) -> Result<Vec<String>> {
        let regex = self.compile(pattern)?;
        Ok(regex.find_iter(sample).map(|m| m.as_str().to_owned()).collect())
    }
}
