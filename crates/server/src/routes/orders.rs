//! Storefront order handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;

use fogon_core::OrderNumber;

use crate::error::{AppError, Result};
use crate::models::Order;
use crate::services::{Confirmation, PlaceOrder, build_confirmation};
use crate::state::AppState;

/// Response to a successful checkout.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order: Order,
    pub confirmation: Confirmation,
    pub customer_created: bool,
}

/// Place an order.
///
/// POST /api/orders
pub async fn place(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrder>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>)> {
    let placed = state.orders().place_order(request).await?;
    let confirmation = build_confirmation(&placed.order, &placed.business);

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            order: placed.order,
            confirmation,
            customer_created: placed.customer_created,
        }),
    ))
}

/// Look up an order by its number.
///
/// GET /api/orders/{orderNumber}
pub async fn show(
    State(state): State<AppState>,
    Path(order_number): Path<String>,
) -> Result<Json<Order>> {
    let number = OrderNumber::parse(&order_number)
        .map_err(|_| AppError::NotFound(format!("order {order_number}")))?;
    Ok(Json(state.orders().get_by_number(&number).await?))
}
