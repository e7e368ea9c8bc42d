//! Catalog validation for order placement.
//!
//! Checks that every requested product and addition is currently orderable
//! and returns the rows so the order can be priced from them. One missing
//! item fails the whole request; nothing is written either way.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use fogon_core::{AdditionId, ProductId};

use super::ServiceError;
use crate::db::CatalogStore;
use crate::models::{Addition, Product};

/// Orderable rows for one order, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: HashMap<ProductId, Product>,
    additions: HashMap<AdditionId, Addition>,
}

impl CatalogSnapshot {
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    #[must_use]
    pub fn addition(&self, id: AdditionId) -> Option<&Addition> {
        self.additions.get(&id)
    }
}

/// Fetch and validate the requested products and additions.
///
/// Duplicated ids are counted once.
///
/// # Errors
///
/// Returns `ServiceError::CatalogUnavailable` listing the ids that are
/// unknown, inactive or unavailable, or `ServiceError::Repository` if the
/// catalog cannot be read.
pub async fn validate_catalog<S: CatalogStore>(
    store: &S,
    product_ids: &[ProductId],
    addition_ids: &[AdditionId],
) -> Result<CatalogSnapshot, ServiceError> {
    let wanted_products: Vec<ProductId> = product_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let wanted_additions: Vec<AdditionId> = addition_ids
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let products = if wanted_products.is_empty() {
        Vec::new()
    } else {
        store.orderable_products(&wanted_products).await?
    };
    let additions = if wanted_additions.is_empty() {
        Vec::new()
    } else {
        store.orderable_additions(&wanted_additions).await?
    };

    let snapshot = CatalogSnapshot {
        products: products.into_iter().map(|p| (p.id, p)).collect(),
        additions: additions.into_iter().map(|a| (a.id, a)).collect(),
    };

    if snapshot.products.len() != wanted_products.len()
        || snapshot.additions.len() != wanted_additions.len()
    {
        let missing_products: Vec<ProductId> = wanted_products
            .into_iter()
            .filter(|id| !snapshot.products.contains_key(id))
            .collect();
        let missing_additions: Vec<AdditionId> = wanted_additions
            .into_iter()
            .filter(|id| !snapshot.additions.contains_key(id))
            .collect();
        warn!(
            products = ?missing_products,
            additions = ?missing_additions,
            "Order references unavailable catalog items"
        );
        return Err(ServiceError::CatalogUnavailable {
            products: missing_products,
            additions: missing_additions,
        });
    }

    Ok(snapshot)
}
