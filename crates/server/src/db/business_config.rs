//! Business configuration (delivery fee, display name, WhatsApp number).
//!
//! The configuration is a single row edited from the back-office. Order
//! placement reads it on every request, so [`CachedBusinessConfig`] keeps the
//! last value for a short TTL.

use std::future::Future;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use fogon_core::{Money, Phone};

use super::PgRepository;

/// Errors reading the business configuration.
#[derive(Debug, Error)]
pub enum BusinessConfigError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The single configuration row does not exist.
    #[error("business configuration row is missing")]
    Missing,
}

/// Current business configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    pub business_name: String,
    /// Flat fee charged on delivery orders.
    pub delivery_fee: Money,
    /// Number customers message to confirm an order.
    pub whatsapp_number: Option<Phone>,
}

/// Source of the current business configuration.
pub trait BusinessConfigProvider: Send + Sync {
    /// Read the current configuration.
    fn current(&self) -> impl Future<Output = Result<BusinessConfig, BusinessConfigError>> + Send;
}

impl BusinessConfigProvider for PgRepository {
    async fn current(&self) -> Result<BusinessConfig, BusinessConfigError> {
        sqlx::query_as::<_, BusinessConfig>(
            "SELECT business_name, delivery_fee, whatsapp_number FROM fogon.business_config WHERE id",
        )
        .fetch_optional(self.pool())
        .await?
        .ok_or(BusinessConfigError::Missing)
    }
}

/// TTL cache in front of another provider.
#[derive(Clone)]
pub struct CachedBusinessConfig<P> {
    inner: P,
    cache: Cache<(), BusinessConfig>,
}

impl<P> CachedBusinessConfig<P> {
    /// Wrap `inner`, caching its value for `ttl`.
    #[must_use]
    pub fn new(inner: P, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { inner, cache }
    }

    /// Drop the cached value so the next read hits the source.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

impl<P: BusinessConfigProvider> BusinessConfigProvider for CachedBusinessConfig<P> {
    async fn current(&self) -> Result<BusinessConfig, BusinessConfigError> {
        if let Some(config) = self.cache.get(&()).await {
            debug!("Cache hit for business config");
            return Ok(config);
        }

        let config = self.inner.current().await?;
        self.cache.insert((), config.clone()).await;
        Ok(config)
    }
}
