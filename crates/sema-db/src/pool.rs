//! Database connection pool management.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use sema_core::{defaults, Error, Result};

/// Default maximum number of connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = defaults::DB_MAX_CONNECTIONS;

/// Idle connections are closed after this long.
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Pool sizing and acquire budget for one collection.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Connections opened eagerly at startup.
    pub min_connections: u32,
    /// How long a query may wait for a free connection. Tracks the index
    /// stage timeout, since a query that waits longer is abandoned anyway.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(defaults::INDEX_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    /// Read pool settings from the environment.
    ///
    /// - `SEMA_DB_MAX_CONNECTIONS` (default: 10)
    /// - `SEMA_INDEX_TIMEOUT_SECS` (default: 10), used as the acquire timeout
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_connections: std::env::var("SEMA_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_connections),
            acquire_timeout: std::env::var("SEMA_INDEX_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
            ..defaults
        }
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Open the pool serving `table`.
///
/// Connection failures surface as `IndexUnavailable`.
pub async fn create_pool(database_url: &str, table: &str, config: &PoolConfig) -> Result<PgPool> {
    if config.max_connections == 0 {
        return Err(Error::Config(
            "max_connections must be at least 1".to_string(),
        ));
    }

    let start = Instant::now();
    info!(
        subsystem = "database",
        component = "pool",
        op = "create",
        db_table = %table,
        max_connections = config.max_connections,
        acquire_timeout_ms = config.acquire_timeout.as_millis() as u64,
        "Creating database connection pool"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(IDLE_TIMEOUT)
        .connect(database_url)
        .await?;

    info!(
        subsystem = "database",
        component = "pool",
        op = "established",
        db_table = %table,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database connection pool established"
    );
    Ok(pool)
}

/// Log pool health before a query. Warns when no idle connections remain.
pub fn log_pool_metrics(pool: &PgPool, table: &str) {
    let size = pool.size();
    let idle = pool.num_idle();

    debug!(
        subsystem = "database",
        component = "pool",
        db_table = %table,
        pool_size = size,
        pool_idle = idle,
        "Pool health check"
    );

    if idle == 0 && size > 0 {
        warn!(
            subsystem = "database",
            component = "pool",
            db_table = %table,
            pool_size = size,
            "Connection pool has no idle connections, queries will queue"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_index_timeout() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_zero_connections_rejected() {
        let err = create_pool(
            "postgres://localhost/unused",
            "inbox_embeddings",
            &PoolConfig::default().max_connections(0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
