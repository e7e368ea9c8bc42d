//! Checkout prefill lookup.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use fogon_core::Phone;

use crate::error::Result;
use crate::models::Address;
use crate::services::{ServiceError, lookup_customer};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub phone: String,
}

/// Prefill data for a phone number. `exists` is `false` for unknown phones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub exists: bool,
    pub phone: Phone,
    pub name: Option<String>,
    pub addresses: Vec<Address>,
}

/// GET /api/customers/lookup?phone=...
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>> {
    let phone = Phone::parse(&query.phone).map_err(ServiceError::from)?;

    let response = match lookup_customer(state.repo(), &phone).await? {
        Some(found) => LookupResponse {
            exists: true,
            phone,
            name: Some(found.customer.name),
            addresses: found.addresses,
        },
        None => LookupResponse {
            exists: false,
            phone,
            name: None,
            addresses: Vec::new(),
        },
    };
    Ok(Json(response))
}
