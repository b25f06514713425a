//! Search policy configuration.

use std::time::Duration;

use sema_core::{defaults, Error, Result};

/// Thresholds, limits, and stage timeouts for [`QueryService`](crate::QueryService).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Minimum cosine similarity a record needs to be returned.
    pub min_score: f32,
    /// Limit used when a query does not carry one.
    pub default_limit: usize,
    /// Larger requested limits are clamped to this.
    pub max_limit: usize,
    /// Deadline for the embedding stage.
    pub embed_timeout: Duration,
    /// Deadline for the retrieval stage.
    pub index_timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_score: defaults::MATCH_THRESHOLD,
            default_limit: defaults::SEARCH_LIMIT,
            max_limit: defaults::MAX_SEARCH_LIMIT,
            embed_timeout: Duration::from_secs(defaults::EMBED_TIMEOUT_SECS),
            index_timeout: Duration::from_secs(defaults::INDEX_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    /// Read configuration from the environment.
    ///
    /// - `SEMA_MATCH_THRESHOLD` (default: 0.8)
    /// - `SEMA_DEFAULT_LIMIT` (default: 10)
    /// - `SEMA_MAX_LIMIT` (default: 100)
    /// - `SEMA_EMBED_TIMEOUT_SECS` (default: 30)
    /// - `SEMA_INDEX_TIMEOUT_SECS` (default: 10)
    ///
    /// Unparsable values fall back to defaults; the result is validated.
    pub fn from_env() -> Result<Self> {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
        }

        let defaults = Self::default();
        let config = Self {
            min_score: parsed("SEMA_MATCH_THRESHOLD").unwrap_or(defaults.min_score),
            default_limit: parsed("SEMA_DEFAULT_LIMIT").unwrap_or(defaults.default_limit),
            max_limit: parsed("SEMA_MAX_LIMIT").unwrap_or(defaults.max_limit),
            embed_timeout: parsed("SEMA_EMBED_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.embed_timeout),
            index_timeout: parsed("SEMA_INDEX_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.index_timeout),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn with_max_limit(mut self, limit: usize) -> Self {
        self.max_limit = limit;
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    pub fn with_index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.min_score) {
            return Err(Error::Config(format!(
                "min_score must be within [-1, 1], got {}",
                self.min_score
            )));
        }
        if self.default_limit == 0 {
            return Err(Error::Config("default_limit must be at least 1".to_string()));
        }
        if self.max_limit < self.default_limit {
            return Err(Error::Config(format!(
                "max_limit ({}) must be >= default_limit ({})",
                self.max_limit, self.default_limit
            )));
        }
        if self.embed_timeout.is_zero() || self.index_timeout.is_zero() {
            return Err(Error::Config("stage timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Resolve a requested limit: absent means the default, zero is rejected,
    /// anything above `max_limit` is clamped.
    pub fn resolve_limit(&self, requested: Option<usize>) -> Result<usize> {
        match requested {
            None => Ok(self.default_limit),
            Some(0) => Err(Error::InvalidQuery("limit must be at least 1".to_string())),
            Some(n) => Ok(n.min(self.max_limit)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.min_score, 0.8);
        assert_eq!(config.default_limit, 10);
        assert_eq!(config.max_limit, 100);
        assert_eq!(config.embed_timeout, Duration::from_secs(30));
        assert_eq!(config.index_timeout, Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::default()
            .with_min_score(0.5)
            .with_default_limit(5)
            .with_max_limit(20)
            .with_embed_timeout(Duration::from_secs(2))
            .with_index_timeout(Duration::from_secs(1));
        assert_eq!(config.min_score, 0.5);
        assert_eq!(config.default_limit, 5);
        assert_eq!(config.max_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_score_bounds() {
        assert!(SearchConfig::default().with_min_score(-1.0).validate().is_ok());
        assert!(SearchConfig::default().with_min_score(1.0).validate().is_ok());
        assert!(matches!(
            SearchConfig::default().with_min_score(1.5).validate(),
            Err(Error::Config(_))
        ));
        assert!(SearchConfig::default()
            .with_min_score(f32::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_limit_consistency() {
        assert!(SearchConfig::default().with_default_limit(0).validate().is_err());
        assert!(SearchConfig::default()
            .with_default_limit(50)
            .with_max_limit(10)
            .validate()
            .is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(SearchConfig::default()
            .with_embed_timeout(Duration::ZERO)
            .validate()
            .is_err());
    }

    #[test]
    fn test_resolve_limit() {
        let config = SearchConfig::default();
        assert_eq!(config.resolve_limit(None).unwrap(), 10);
        assert_eq!(config.resolve_limit(Some(3)).unwrap(), 3);
        assert_eq!(config.resolve_limit(Some(5000)).unwrap(), 100);
        assert!(matches!(
            config.resolve_limit(Some(0)),
            Err(Error::InvalidQuery(_))
        ));
    }
}
