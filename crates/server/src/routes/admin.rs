//! Back-office order handlers. Every handler requires a staff session.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::Deserialize;

use fogon_core::{OrderId, OrderStatus};

use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::{Order, OrderFilter};
use crate::services::StatusChange;
use crate::state::AppState;

/// Query of `GET /admin/api/orders`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    /// Calendar date of the order number, `YYYY-MM-DD`.
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

impl From<ListQuery> for OrderFilter {
    fn from(query: ListQuery) -> Self {
        Self {
            status: query.status,
            date: query.date,
            customer_id: None,
            limit: query.limit.unwrap_or(Self::DEFAULT_LIMIT),
        }
    }
}

/// GET /admin/api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders().list(&query.into()).await?))
}

/// GET /admin/api/orders/{id}
pub async fn show_order(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders().get(id).await?))
}

/// PATCH /admin/api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<OrderId>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Order>> {
    tracing::debug!(staff_id = %staff.customer_id, order_id = %id, "Status change requested");
    Ok(Json(state.orders().update_status(id, change).await?))
}
