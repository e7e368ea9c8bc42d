//! Order number allocation.
//!
//! Numbers are `ORD-YYYYMMDD-NNN`, one sequence per calendar day. The next
//! number is computed from the highest existing one and inserted together
//! with the order; if another request took that number first, the unique
//! constraint rejects the insert and the whole read-increment-insert step is
//! repeated.

use chrono::NaiveDate;
use tracing::{info, warn};

use fogon_core::OrderNumber;

use super::ServiceError;
use crate::db::{OrderStore, RepositoryError};
use crate::models::{NewOrder, Order};

/// Attempts before an order number conflict is reported as contention.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// The number the next order of `date` would get.
///
/// # Errors
///
/// Returns `ServiceError::Repository` on storage failure.
pub async fn next_order_number<S: OrderStore>(
    store: &S,
    date: NaiveDate,
) -> Result<OrderNumber, ServiceError> {
    let latest = store
        .latest_order_number(&OrderNumber::day_prefix(date))
        .await?;
    Ok(OrderNumber::next_for_day(date, latest.as_ref())?)
}

/// Allocate a number on `date` and insert the order built for it.
///
/// `build` is called once per attempt with the candidate number.
///
/// # Errors
///
/// Returns `ServiceError::Contention` after [`MAX_ALLOCATION_ATTEMPTS`]
/// conflicts, or `ServiceError::Repository` if the insert fails otherwise
/// (in which case nothing was written).
pub async fn insert_with_order_number<S, F>(
    store: &S,
    date: NaiveDate,
    mut build: F,
) -> Result<Order, ServiceError>
where
    S: OrderStore,
    F: FnMut(OrderNumber) -> NewOrder + Send,
{
    for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
        let number = next_order_number(store, date).await?;
        let order = build(number);

        match store.insert_order(&order).await {
            Ok(stored) => {
                info!(order_number = %stored.order_number, attempt, "Order number allocated");
                return Ok(stored);
            }
            Err(RepositoryError::Conflict(constraint)) => {
                warn!(
                    order_number = %order.order_number,
                    attempt,
                    %constraint,
                    "Order number taken, retrying"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::Contention("order number"))
}
