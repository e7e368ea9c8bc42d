//! Order repository.
//!
//! An order, its items and their additions are inserted in one transaction.
//! A taken order number surfaces as `RepositoryError::Conflict` and rolls the
//! whole graph back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, Postgres, QueryBuilder};

use fogon_core::{OrderId, OrderItemId, OrderNumber, OrderStatus};

use super::{OrderStore, PgRepository, RepositoryError};
use crate::models::{NewOrder, Order, OrderFilter, OrderItem, OrderItemAddition};

const ORDER_COLUMNS: &str = r"
    id, order_number, customer_id, customer_name, customer_phone, customer_email,
    fulfillment_type, address_id, delivery_address, subtotal, delivery_fee, total,
    payment_method, payment_reference, notes, status,
    confirmed_at, preparing_at, ready_at, delivered_at, cancelled_at,
    admin_notes, created_at, updated_at";

/// Attach items (and their additions) to loaded orders.
async fn attach_items(
    conn: &mut PgConnection,
    orders: &mut [Order],
) -> Result<(), RepositoryError> {
    if orders.is_empty() {
        return Ok(());
    }

    let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
    let mut items = sqlx::query_as::<_, OrderItem>(
        r"
        SELECT id, order_id, product_id, product_name, unit_price, quantity, line_total, position
        FROM fogon.order_items
        WHERE order_id = ANY($1)
        ORDER BY order_id, position
        ",
    )
    .bind(&order_ids)
    .fetch_all(&mut *conn)
    .await?;

    let item_ids: Vec<i32> = items.iter().map(|i| i.id.as_i32()).collect();
    let additions = sqlx::query_as::<_, OrderItemAddition>(
        r"
        SELECT id, order_item_id, addition_id, addition_name, price
        FROM fogon.order_item_additions
        WHERE order_item_id = ANY($1)
        ORDER BY id
        ",
    )
    .bind(&item_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_item: HashMap<OrderItemId, Vec<OrderItemAddition>> = HashMap::new();
    for addition in additions {
        by_item.entry(addition.order_item_id).or_default().push(addition);
    }
    for item in &mut items {
        item.additions = by_item.remove(&item.id).unwrap_or_default();
    }

    let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }

    Ok(())
}

async fn load_single(
    conn: &mut PgConnection,
    column: &str,
    bind: impl FnOnce(&mut QueryBuilder<'_, Postgres>),
) -> Result<Option<Order>, RepositoryError> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {ORDER_COLUMNS} FROM fogon.orders WHERE {column} = "
    ));
    bind(&mut query);

    let Some(order) = query
        .build_query_as::<Order>()
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let mut orders = [order];
    attach_items(conn, &mut orders).await?;
    let [order] = orders;
    Ok(Some(order))
}

impl OrderStore for PgRepository {
    async fn latest_order_number(
        &self,
        day_prefix: &str,
    ) -> Result<Option<OrderNumber>, RepositoryError> {
        // Longer numbers sort first so that sequence 1000 beats 999.
        let raw = sqlx::query_scalar::<_, String>(
            r"
            SELECT order_number
            FROM fogon.orders
            WHERE order_number LIKE $1 || '%'
            ORDER BY length(order_number) DESC, order_number DESC
            LIMIT 1
            ",
        )
        .bind(day_prefix)
        .fetch_optional(self.pool())
        .await?;

        raw.map(|s| {
            OrderNumber::parse(&s).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid order number in database: {e}"))
            })
        })
        .transpose()
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO fogon.orders (
                order_number, customer_id, customer_name, customer_phone, customer_email,
                fulfillment_type, address_id, delivery_address, subtotal, delivery_fee, total,
                payment_method, payment_reference, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(&order.order_number)
        .bind(order.customer_id)
        .bind(&order.customer_name)
        .bind(&order.customer_phone)
        .bind(order.customer_email.as_ref())
        .bind(order.fulfillment_type)
        .bind(order.address_id)
        .bind(order.delivery_address.as_deref())
        .bind(order.subtotal)
        .bind(order.delivery_fee)
        .bind(order.total)
        .bind(order.payment_method)
        .bind(order.payment_reference.as_deref())
        .bind(order.notes.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_insert)?;

        for (position, item) in (0_i32..).zip(&order.items) {
            let item_id = sqlx::query_scalar::<_, OrderItemId>(
                r"
                INSERT INTO fogon.order_items (
                    order_id, product_id, product_name, unit_price, quantity, line_total, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                ",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.line_total)
            .bind(position)
            .fetch_one(&mut *tx)
            .await?;

            for addition in &item.additions {
                sqlx::query(
                    r"
                    INSERT INTO fogon.order_item_additions (
                        order_item_id, addition_id, addition_name, price
                    )
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(item_id)
                .bind(addition.addition_id)
                .bind(&addition.addition_name)
                .bind(addition.price)
                .execute(&mut *tx)
                .await?;
            }
        }

        let stored = load_single(&mut tx, "id", |q| {
            q.push_bind(order_id);
        })
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(stored)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool().acquire().await?;
        load_single(&mut conn, "id", |q| {
            q.push_bind(id);
        })
        .await
    }

    async fn order_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool().acquire().await?;
        let number = number.clone();
        load_single(&mut conn, "order_number", move |q| {
            q.push_bind(number);
        })
        .await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ORDER_COLUMNS} FROM fogon.orders WHERE TRUE"
        ));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(date) = filter.date {
            query
                .push(" AND order_number LIKE ")
                .push_bind(format!("{}%", OrderNumber::day_prefix(date)));
        }
        if let Some(customer_id) = filter.customer_id {
            query.push(" AND customer_id = ").push_bind(customer_id);
        }
        query
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(filter.limit.clamp(1, OrderFilter::MAX_LIMIT));

        let mut conn = self.pool().acquire().await?;
        let mut orders = query
            .build_query_as::<Order>()
            .fetch_all(&mut *conn)
            .await?;
        attach_items(&mut conn, &mut orders).await?;

        Ok(orders)
    }

    async fn save_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        stamped_at: DateTime<Utc>,
        admin_notes: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        // Each timestamp column is only written when it matches the new status,
        // so concurrent updates to different statuses keep each other's stamps.
        let updated = sqlx::query(
            r"
            UPDATE fogon.orders
            SET status = $2,
                confirmed_at = CASE WHEN $2 = 'confirmed' THEN $3 ELSE confirmed_at END,
                preparing_at = CASE WHEN $2 = 'preparing' THEN $3 ELSE preparing_at END,
                ready_at = CASE WHEN $2 = 'ready' THEN $3 ELSE ready_at END,
                delivered_at = CASE WHEN $2 = 'delivered' THEN $3 ELSE delivered_at END,
                cancelled_at = CASE WHEN $2 = 'cancelled' THEN $3 ELSE cancelled_at END,
                admin_notes = COALESCE($4, admin_notes),
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(status)
        .bind(stamped_at)
        .bind(admin_notes)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let order = load_single(&mut tx, "id", |q| {
            q.push_bind(id);
        })
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(order)
    }
}
