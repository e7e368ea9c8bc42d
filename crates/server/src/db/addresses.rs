//! Address repository.
//!
//! Every mutation runs in a transaction that first locks the owning customer
//! row (`SELECT ... FOR UPDATE`), so concurrent changes to one customer's
//! addresses are applied one at a time. The partial unique index
//! `addresses_one_default_per_customer` rejects anything that slips past.

use sqlx::PgConnection;

use fogon_core::{AddressId, CustomerId};

use super::{AddressStore, PgRepository, RepositoryError};
use crate::models::address::{self, DefaultFlagPlan};
use crate::models::{Address, AddressPatch};

const ADDRESS_COLUMNS: &str = "id, customer_id, address, is_default, created_at";

/// Lock the customer row for the rest of the transaction.
async fn lock_customer(
    conn: &mut PgConnection,
    customer_id: CustomerId,
) -> Result<(), RepositoryError> {
    sqlx::query_scalar::<_, i32>("SELECT id FROM fogon.customers WHERE id = $1 FOR UPDATE")
        .bind(customer_id)
        .fetch_optional(conn)
        .await?
        .map(|_| ())
        .ok_or(RepositoryError::NotFound)
}

async fn load_for_customer(
    conn: &mut PgConnection,
    customer_id: CustomerId,
) -> Result<Vec<Address>, RepositoryError> {
    let rows = sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM fogon.addresses WHERE customer_id = $1"
    ))
    .bind(customer_id)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}

async fn load_one(
    conn: &mut PgConnection,
    id: AddressId,
) -> Result<Option<Address>, RepositoryError> {
    let row = sqlx::query_as::<_, Address>(&format!(
        "SELECT {ADDRESS_COLUMNS} FROM fogon.addresses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// Apply a flag plan: clear old defaults first, then promote.
async fn apply_plan(conn: &mut PgConnection, plan: &DefaultFlagPlan) -> Result<(), RepositoryError> {
    if !plan.clear.is_empty() {
        let ids: Vec<i32> = plan.clear.iter().map(AddressId::as_i32).collect();
        sqlx::query(
            "UPDATE fogon.addresses SET is_default = FALSE, updated_at = NOW() WHERE id = ANY($1)",
        )
        .bind(&ids)
        .execute(&mut *conn)
        .await?;
    }

    if let Some(id) = plan.promote {
        sqlx::query("UPDATE fogon.addresses SET is_default = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(RepositoryError::from_insert)?;
    }

    Ok(())
}

impl AddressStore for PgRepository {
    async fn address_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let mut conn = self.pool().acquire().await?;
        load_one(&mut conn, id).await
    }

    async fn addresses_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, Address>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM fogon.addresses
            WHERE customer_id = $1
            ORDER BY is_default DESC, created_at DESC, id DESC
            "
        ))
        .bind(customer_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }

    async fn insert_address(
        &self,
        customer_id: CustomerId,
        address_text: &str,
        requested_default: bool,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool().begin().await?;
        lock_customer(&mut tx, customer_id).await?;

        let existing = load_for_customer(&mut tx, customer_id).await?;
        let (is_default, plan) = address::plan_insert(&existing, requested_default);
        apply_plan(&mut tx, &plan).await?;

        let inserted = sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO fogon.addresses (customer_id, address, is_default)
            VALUES ($1, $2, $3)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(customer_id)
        .bind(address_text)
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_insert)?;

        tx.commit().await?;
        Ok(inserted)
    }

    async fn update_address(
        &self,
        id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Address, RepositoryError> {
        let owner = self
            .address_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .customer_id;

        let mut tx = self.pool().begin().await?;
        lock_customer(&mut tx, owner).await?;

        let siblings = load_for_customer(&mut tx, owner).await?;
        let target = siblings
            .iter()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let plan = address::plan_update(&siblings, target, patch);

        if let Some(text) = &patch.address {
            sqlx::query("UPDATE fogon.addresses SET address = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(text)
                .execute(&mut *tx)
                .await?;
        }
        apply_plan(&mut tx, &plan).await?;

        let updated = load_one(&mut tx, id).await?.ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_address(&self, id: AddressId) -> Result<Address, RepositoryError> {
        let owner = self
            .address_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .customer_id;

        let mut tx = self.pool().begin().await?;
        lock_customer(&mut tx, owner).await?;

        let deleted = sqlx::query_as::<_, Address>(&format!(
            "DELETE FROM fogon.addresses WHERE id = $1 RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let remaining = load_for_customer(&mut tx, owner).await?;
        apply_plan(&mut tx, &address::plan_delete(&remaining, &deleted)).await?;

        tx.commit().await?;
        Ok(deleted)
    }
}
