//! Persistence for the ordering platform.
//!
//! # Database: `fogon` schema
//!
//! ## Tables
//!
//! - `categories`, `products`, `additions` - Catalog (written by admin CRUD)
//! - `customers` - Phone-keyed customers (`UNIQUE(phone)`)
//! - `addresses` - Saved addresses, at most one `is_default` per customer
//! - `orders` - Placed orders (`UNIQUE(order_number)`)
//! - `order_items`, `order_item_additions` - Denormalized order lines
//! - `business_config` - Single row with the delivery fee
//!
//! # Store traits
//!
//! The order pipeline talks to storage through the traits below so it can
//! run against [`PgRepository`] in production and an in-memory store in
//! tests. Implementations own the atomicity guarantees: address mutations
//! are serialized per customer, and an order graph is inserted all-or-nothing.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p fogon-cli -- migrate
//! ```

pub mod addresses;
pub mod business_config;
pub mod catalog;
pub mod customers;
pub mod orders;

#[cfg(test)]
pub mod memory;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use fogon_core::{
    AdditionId, AddressId, CustomerId, OrderId, OrderNumber, OrderStatus, Phone, ProductId,
};

use crate::models::{
    Addition, Address, AddressPatch, Customer, NewOrder, Order, OrderFilter, Product,
};

pub use business_config::{
    BusinessConfig, BusinessConfigError, BusinessConfigProvider, CachedBusinessConfig,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (phone, order number).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into `Conflict`.
    pub(crate) fn from_insert(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(db_err.constraint().unwrap_or("unique").to_owned());
        }
        Self::Database(e)
    }
}

/// Read access to the currently orderable catalog.
pub trait CatalogStore: Send + Sync {
    /// Products among `ids` that are active and available.
    fn orderable_products(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;

    /// Additions among `ids` that are active.
    fn orderable_additions(
        &self,
        ids: &[AdditionId],
    ) -> impl Future<Output = Result<Vec<Addition>, RepositoryError>> + Send;
}

/// Customer rows keyed by phone.
pub trait CustomerStore: Send + Sync {
    /// Find a customer by normalized phone.
    fn customer_by_phone(
        &self,
        phone: &Phone,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// Find a customer by id.
    fn customer_by_id(
        &self,
        id: CustomerId,
    ) -> impl Future<Output = Result<Option<Customer>, RepositoryError>> + Send;

    /// Insert a customer with role `customer` and status `active`.
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already taken.
    fn insert_customer(
        &self,
        phone: &Phone,
        name: &str,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;

    /// Replace a customer's display name.
    fn update_customer_name(
        &self,
        id: CustomerId,
        name: &str,
    ) -> impl Future<Output = Result<Customer, RepositoryError>> + Send;
}

/// Saved addresses. Mutations keep exactly one default per customer with
/// addresses, serialized per customer.
pub trait AddressStore: Send + Sync {
    /// Find an address by id.
    fn address_by_id(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Option<Address>, RepositoryError>> + Send;

    /// All addresses of a customer, default first, then newest first.
    fn addresses_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Address>, RepositoryError>> + Send;

    /// Insert an address, applying the first-address and single-default rules.
    fn insert_address(
        &self,
        customer_id: CustomerId,
        address: &str,
        requested_default: bool,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// Patch an address; making it default clears the previous default.
    fn update_address(
        &self,
        id: AddressId,
        patch: &AddressPatch,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;

    /// Delete an address, promoting the newest remaining one if it was the
    /// default. Returns the deleted row.
    fn delete_address(
        &self,
        id: AddressId,
    ) -> impl Future<Output = Result<Address, RepositoryError>> + Send;
}

/// Orders and their line items.
pub trait OrderStore: Send + Sync {
    /// Highest order number starting with `day_prefix`.
    fn latest_order_number(
        &self,
        day_prefix: &str,
    ) -> impl Future<Output = Result<Option<OrderNumber>, RepositoryError>> + Send;

    /// Insert an order with all items and additions atomically.
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken; in
    /// that case nothing was written.
    fn insert_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Find an order (with items) by id.
    fn order_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Find an order (with items) by number.
    fn order_by_number(
        &self,
        number: &OrderNumber,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// List orders (with items), newest first.
    fn list_orders(
        &self,
        filter: &OrderFilter,
    ) -> impl Future<Output = Result<Vec<Order>, RepositoryError>> + Send;

    /// Persist a status change, stamping only the timestamp that belongs to
    /// `status` with `stamped_at`. Other timestamps are left as stored.
    fn save_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        stamped_at: DateTime<Utc>,
        admin_notes: Option<&str>,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

/// `PostgreSQL` implementation of every store trait.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Create a repository over a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
