//! Integration tests for Fogon.
//!
//! # Running Tests
//!
//! ```bash
//! export FOGON_TEST_DATABASE_URL=postgres://localhost/fogon_test
//! cargo test -p fogon-integration-tests -- --ignored
//! ```
//!
//! The HTTP smoke tests additionally need a running server at
//! `FOGON_TEST_BASE_URL` (default `http://localhost:3000`) backed by the
//! same database.
//!
//! Every test creates its own products and phone numbers, so tests can share
//! one database and run in parallel.

use fogon_core::{Phone, ProductId};
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

/// Nine random digits.
fn unique_suffix() -> u128 {
    Uuid::new_v4().as_u128() % 1_000_000_000
}

/// Connect to the test database and apply migrations.
///
/// # Panics
///
/// Panics if `FOGON_TEST_DATABASE_URL` is unset or the database is
/// unreachable.
pub async fn test_pool() -> PgPool {
    let url = std::env::var("FOGON_TEST_DATABASE_URL")
        .expect("FOGON_TEST_DATABASE_URL must be set for integration tests");
    let pool = fogon_server::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// A phone number no other test uses.
///
/// # Panics
///
/// Never in practice; the generated number is always well-formed.
#[must_use]
pub fn unique_phone() -> Phone {
    Phone::parse(&format!("3{:09}", unique_suffix())).expect("generated phone is valid")
}

/// Base URL of a running server for HTTP tests.
#[must_use]
pub fn base_url() -> String {
    std::env::var("FOGON_TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Insert an active, available product in a fresh category.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn insert_product(pool: &PgPool, name: &str, price: i64) -> ProductId {
    let category_id: i32 = sqlx::query_scalar(
        "INSERT INTO fogon.categories (name) VALUES ($1) RETURNING id",
    )
    .bind(format!("Test {}", unique_suffix()))
    .fetch_one(pool)
    .await
    .expect("Failed to insert category");

    let id: i32 = sqlx::query_scalar(
        "INSERT INTO fogon.products (category_id, name, price) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(category_id)
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("Failed to insert product");

    ProductId::new(id)
}
