//! Customer repository.

use fogon_core::{CustomerId, Phone};

use super::{CustomerStore, PgRepository, RepositoryError};
use crate::models::Customer;

const CUSTOMER_COLUMNS: &str = "id, phone, name, email, role, status, created_at, updated_at";

impl CustomerStore for PgRepository {
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    async fn customer_by_phone(&self, phone: &Phone) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM fogon.customers WHERE phone = $1"
        ))
        .bind(phone)
        .fetch_optional(self.pool())
        .await?;

        Ok(customer)
    }

    async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM fogon.customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(customer)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn insert_customer(&self, phone: &Phone, name: &str) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            r"
            INSERT INTO fogon.customers (phone, name)
            VALUES ($1, $2)
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(phone)
        .bind(name)
        .fetch_one(self.pool())
        .await
        .map_err(RepositoryError::from_insert)
    }

    async fn update_customer_name(
        &self,
        id: CustomerId,
        name: &str,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            r"
            UPDATE fogon.customers
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool())
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
