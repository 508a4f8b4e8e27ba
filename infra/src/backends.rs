//! Backend selection
//!
//! Builds the challenge store and rate limiter named by configuration and
//! keeps the underlying pools for health checks and shutdown.

use std::sync::Arc;

use cg_core::repositories::{ChallengeStore, InMemoryChallengeStore};
use cg_core::services::{Clock, InMemoryRateLimiter, RateLimiterTrait};
use cg_shared::config::{AppConfig, RateLimitBackend, StorageBackend};

#[cfg(feature = "redis-cache")]
use crate::cache::{RedisClient, RedisRateLimiter};
#[cfg(feature = "mysql")]
use crate::database::{DatabasePool, MySqlChallengeStore, MySqlRateLimiter};
use crate::InfrastructureError;

/// Storage and rate-limit adapters for one process
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn ChallengeStore>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
    #[cfg(feature = "mysql")]
    database: Option<DatabasePool>,
    #[cfg(feature = "redis-cache")]
    redis: Option<Arc<RedisClient>>,
}

impl Backends {
    /// Process-local adapters, for development and tests
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(InMemoryChallengeStore::new()),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(clock)),
            #[cfg(feature = "mysql")]
            database: None,
            #[cfg(feature = "redis-cache")]
            redis: None,
        }
    }

    /// Connect the backends selected by `config`
    ///
    /// Opens the MySQL pool only when the store or the limiter needs it,
    /// and applies migrations when `run_migrations` is set.
    pub async fn connect(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Self, InfrastructureError> {
        tracing::info!(
            storage_backend = ?config.storage_backend,
            rate_limit_backend = ?config.rate_limit_backend,
            "Initializing storage backends"
        );

        let mut backends = Self::in_memory(clock.clone());

        #[cfg(feature = "mysql")]
        {
            let needs_mysql = config.storage_backend == StorageBackend::Mysql
                || config.rate_limit_backend == RateLimitBackend::Mysql;
            if needs_mysql {
                let pool = DatabasePool::new(config.database.clone()).await?;
                if config.database.run_migrations {
                    pool.run_migrations().await?;
                }
                if config.storage_backend == StorageBackend::Mysql {
                    backends.store = Arc::new(MySqlChallengeStore::new(pool.get_pool().clone()));
                }
                if config.rate_limit_backend == RateLimitBackend::Mysql {
                    backends.rate_limiter = Arc::new(MySqlRateLimiter::new(pool.get_pool().clone(), clock.clone()));
                }
                backends.database = Some(pool);
            }
        }
        #[cfg(not(feature = "mysql"))]
        {
            if config.storage_backend == StorageBackend::Mysql || config.rate_limit_backend == RateLimitBackend::Mysql {
                return Err(InfrastructureError::Config(
                    "MySQL backend selected but the `mysql` feature is disabled".to_string(),
                ));
            }
        }

        if config.rate_limit_backend == RateLimitBackend::Redis {
            #[cfg(feature = "redis-cache")]
            {
                let client = Arc::new(RedisClient::new(config.cache.clone()).await?);
                backends.rate_limiter = Arc::new(RedisRateLimiter::new(client.clone(), clock));
                backends.redis = Some(client);
            }
            #[cfg(not(feature = "redis-cache"))]
            {
                return Err(InfrastructureError::Config(
                    "Redis rate limiting selected but the `redis-cache` feature is disabled".to_string(),
                ));
            }
        }

        tracing::info!("Storage backends initialized successfully");
        Ok(backends)
    }

    /// True when every connected backend answers
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            if !database.health_check().await? {
                return Ok(false);
            }
        }
        #[cfg(feature = "redis-cache")]
        if let Some(redis) = &self.redis {
            if !redis.health_check().await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Release pooled connections
    pub async fn close(&self) {
        #[cfg(feature = "mysql")]
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}
