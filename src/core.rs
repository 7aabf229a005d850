//! Core Queryhaus functionality
//!
//! `QueryHaus` owns the query facade and the backing store behind it, and
//! hands out the cache admin router.

use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use store_object::{BackingStore, PgStore, QueryFacade};

use crate::errors::QueryHausError;
use crate::routes::cache_router;
use config::{AppConfig, CacheConfig, DatabaseConfig, QueryConfig};

/// Main Queryhaus coordinator
pub struct QueryHaus<S: BackingStore = PgStore> {
    facade: Arc<QueryFacade<S>>,
}

impl QueryHaus<PgStore> {
    /// Validate `config`, open the Postgres pool and build the facade
    pub async fn connect(config: AppConfig) -> Result<Self, QueryHausError> {
        config.validate()?;
        let pool = Self::open_pool(&config.database).await?;
        tracing::info!(
            host = %config.database.host,
            database = %config.database.database,
            cache_size = config.cache.max_size,
            "queryhaus connected"
        );

        Self::with_store(PgStore::new(pool), &config.cache, &config.query)
    }

    async fn open_pool(config: &DatabaseConfig) -> Result<PgPool, QueryHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        Ok(pool_options.connect(&connection_string).await?)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        self.facade.store().pool()
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), QueryHausError> {
        sqlx::query("SELECT 1").fetch_one(self.pool()).await?;
        Ok(())
    }
}

impl<S: BackingStore + 'static> QueryHaus<S> {
    /// Build over any backing store
    pub fn with_store(
        store: S,
        cache: &CacheConfig,
        query: &QueryConfig,
    ) -> Result<Self, QueryHausError> {
        cache.validate()?;
        query.validate()?;
        let facade = QueryFacade::from_config(store, cache, query)?;
        Ok(Self {
            facade: Arc::new(facade),
        })
    }

    pub fn facade(&self) -> &Arc<QueryFacade<S>> {
        &self.facade
    }

    /// `GET /cache/stats` and `POST /cache/clear` over this facade
    pub fn router(&self) -> Router {
        cache_router(self.facade.clone())
    }
}
