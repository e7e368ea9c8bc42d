//! Orders and their denormalized line items.
//!
//! Names and prices of products and additions are copied onto the order when
//! it is placed, so later catalog edits never change order history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use fogon_core::{
    AdditionId, AddressId, CustomerId, Email, FulfillmentType, Money, OrderId, OrderItemId,
    OrderNumber, OrderStatus, PaymentMethod, Phone, ProductId, Quantity, StatusTimestamps,
};

/// A placed order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: Phone,
    pub customer_email: Option<Email>,
    pub fulfillment_type: FulfillmentType,
    pub address_id: Option<AddressId>,
    pub delivery_address: Option<String>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: StatusTimestamps,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Check the pricing invariants of a stored order.
    ///
    /// `total = subtotal + delivery_fee`, `delivery_fee = 0` for pickup, and
    /// `subtotal` equals the sum of line totals.
    #[must_use]
    pub fn pricing_is_consistent(&self) -> bool {
        let lines = Money::checked_sum(self.items.iter().map(|i| i.line_total));
        self.subtotal.checked_add(self.delivery_fee) == Ok(self.total)
            && (self.fulfillment_type == FulfillmentType::Delivery || self.delivery_fee.is_zero())
            && lines == Ok(self.subtotal)
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(skip)]
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub line_total: Money,
    pub position: i32,
    #[sqlx(skip)]
    pub additions: Vec<OrderItemAddition>,
}

/// An addition snapshot attached to an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemAddition {
    #[serde(skip)]
    pub id: i32,
    #[serde(skip)]
    pub order_item_id: OrderItemId,
    pub addition_id: Option<AdditionId>,
    pub addition_name: String,
    pub price: Money,
}

/// A fully priced order ready to be persisted as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub customer_phone: Phone,
    pub customer_email: Option<Email>,
    pub fulfillment_type: FulfillmentType,
    pub address_id: Option<AddressId>,
    pub delivery_address: Option<String>,
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

/// A priced line of a [`NewOrder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: Quantity,
    pub line_total: Money,
    pub additions: Vec<NewOrderItemAddition>,
}

/// An addition snapshot of a [`NewOrderItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItemAddition {
    pub addition_id: AdditionId,
    pub addition_name: String,
    pub price: Money,
}

/// Filters for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Calendar date encoded in the order number.
    pub date: Option<NaiveDate>,
    pub customer_id: Option<CustomerId>,
    pub limit: i64,
}

impl OrderFilter {
    /// Default page size.
    pub const DEFAULT_LIMIT: i64 = 50;
    /// Largest page size accepted.
    pub const MAX_LIMIT: i64 = 200;
}

impl Default for OrderFilter {
    fn default() -> Self {
        Self {
            status: None,
            date: None,
            customer_id: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}
