//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::db::{CachedBusinessConfig, PgRepository};
use crate::services::{AddressService, OrderService, SystemClock};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    repo: PgRepository,
    business_config: CachedBusinessConfig<PgRepository>,
    clock: SystemClock,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let repo = PgRepository::new(pool.clone());
        let business_config = CachedBusinessConfig::new(repo.clone(), config.config_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                repo,
                business_config,
                clock: SystemClock,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the repository.
    #[must_use]
    pub fn repo(&self) -> &PgRepository {
        &self.inner.repo
    }

    /// Order pipeline bound to this state.
    #[must_use]
    pub fn orders(&self) -> OrderService<'_, PgRepository, CachedBusinessConfig<PgRepository>> {
        OrderService::new(
            &self.inner.repo,
            &self.inner.business_config,
            &self.inner.clock,
            self.inner.config.order_utc_offset,
        )
    }

    /// Address operations bound to this state.
    #[must_use]
    pub fn addresses(&self) -> AddressService<'_, PgRepository> {
        AddressService::new(&self.inner.repo)
    }
}
