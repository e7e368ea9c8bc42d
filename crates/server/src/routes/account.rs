//! Account route handlers.
//!
//! These routes require a session identity.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use fogon_core::AddressId;

use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::models::{Address, AddressPatch, Order, OrderFilter};
use crate::state::AppState;

/// Body of `POST /api/account/addresses`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub address: String,
    #[serde(default)]
    pub is_default: bool,
}

/// GET /api/account/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(state.addresses().list(user.customer_id).await?))
}

/// POST /api/account/addresses
pub async fn create_address(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Json(body): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>)> {
    let created = state
        .addresses()
        .create(user.customer_id, &body.address, body.is_default)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/account/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Path(id): Path<AddressId>,
    Json(patch): Json<AddressPatch>,
) -> Result<Json<Address>> {
    Ok(Json(
        state.addresses().update(user.customer_id, id, patch).await?,
    ))
}

/// DELETE /api/account/addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    state.addresses().delete(user.customer_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/account/orders
pub async fn orders(
    State(state): State<AppState>,
    RequireCustomer(user): RequireCustomer,
) -> Result<Json<Vec<Order>>> {
    let filter = OrderFilter {
        customer_id: Some(user.customer_id),
        ..OrderFilter::default()
    };
    Ok(Json(state.orders().list(&filter).await?))
}
