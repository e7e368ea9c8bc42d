//! Catalog reads for order validation.

use fogon_core::{AdditionId, ProductId};

use super::{CatalogStore, PgRepository, RepositoryError};
use crate::models::{Addition, Product};

impl CatalogStore for PgRepository {
    async fn orderable_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, category_id, name, price, description, image_url,
                   is_active, is_available, display_order
            FROM fogon.products
            WHERE id = ANY($1) AND is_active AND is_available
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        Ok(products)
    }

    async fn orderable_additions(
        &self,
        ids: &[AdditionId],
    ) -> Result<Vec<Addition>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(AdditionId::as_i32).collect();
        let additions = sqlx::query_as::<_, Addition>(
            r"
            SELECT id, name, price, is_active, display_order
            FROM fogon.additions
            WHERE id = ANY($1) AND is_active
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        Ok(additions)
    }
}
