//! Catalog entities as seen by the order pipeline.
//!
//! Admin CRUD over these tables lives outside this crate; the pipeline only
//! reads the rows that are currently orderable.

use serde::Serialize;

use fogon_core::{AdditionId, CategoryId, Money, ProductId};

/// A menu product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Money,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_available: bool,
    pub display_order: i32,
}

impl Product {
    /// Only active and available products can be ordered.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        self.is_active && self.is_available
    }
}

/// An optional add-on, priced independently of any product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Addition {
    pub id: AdditionId,
    pub name: String,
    pub price: Money,
    pub is_active: bool,
    pub display_order: i32,
}

impl Addition {
    /// Only active additions can be ordered.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        self.is_active
    }
}
