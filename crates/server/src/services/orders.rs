//! Order placement and status management.
//!
//! # Placing an order
//!
//! 1. Validate input (before any storage access), including that delivery
//!    orders carry an address or a saved address id
//! 2. Resolve or create the customer by phone
//! 3. Use the saved address if it belongs to that customer
//! 4. Validate every product and addition against the live catalog
//! 5. Read the business configuration and its delivery fee (zero for pickup)
//! 6. Price each line, snapshotting names and prices
//! 7. `total = subtotal + delivery_fee`
//! 8. Allocate the order number and
//! 9. insert the order graph atomically
//! 10. Return the stored order with the configuration it was priced under

use std::collections::BTreeSet;

use chrono::FixedOffset;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use fogon_core::{
    AdditionId, AddressId, CustomerId, Email, FulfillmentType, Money, OrderId, OrderNumber,
    OrderStatus, PaymentMethod, Phone, ProductId, Quantity, TransitionKind,
};

use super::addresses::{AddressService, delivery_text};
use super::catalog::{CatalogSnapshot, validate_catalog};
use super::clock::Clock;
use super::customers::resolve_customer;
use super::input::{MAX_NAME_CHARS, MAX_NOTES_CHARS, optional_text, required_text};
use super::order_number::insert_with_order_number;
use super::ServiceError;
use crate::db::{
    AddressStore, BusinessConfig, BusinessConfigProvider, CatalogStore, CustomerStore, OrderStore,
};
use crate::models::{NewOrder, NewOrderItem, NewOrderItemAddition, Order, OrderFilter};

/// Checkout request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrder {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub fulfillment_type: FulfillmentType,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub address_id: Option<AddressId>,
    #[serde(default)]
    pub notes: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_reference: Option<String>,
    pub items: Vec<OrderLine>,
}

/// One requested line of a [`PlaceOrder`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(default)]
    pub addition_ids: Vec<AdditionId>,
}

/// Staff status change.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

/// A placed order and whether its customer was created by this checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub customer_created: bool,
    /// Configuration read before the insert; the confirmation is built from it.
    pub business: BusinessConfig,
}

/// Checkout input after validation.
struct ValidCheckout {
    name: String,
    phone: Phone,
    email: Option<Email>,
    fulfillment_type: FulfillmentType,
    delivery_address: Option<String>,
    address_id: Option<AddressId>,
    notes: Option<String>,
    payment_method: PaymentMethod,
    payment_reference: Option<String>,
    lines: Vec<ValidLine>,
}

struct ValidLine {
    product_id: ProductId,
    quantity: Quantity,
    addition_ids: Vec<AdditionId>,
}

impl PlaceOrder {
    fn validate(self) -> Result<ValidCheckout, ServiceError> {
        if self.items.is_empty() {
            return Err(ServiceError::validation("order must contain at least one item"));
        }

        let name = required_text(&self.customer_name, "customerName", MAX_NAME_CHARS)?;
        let phone = Phone::parse(&self.customer_phone)?;
        let email = optional_text(
            self.customer_email.as_deref(),
            "customerEmail",
            Email::MAX_LENGTH,
        )?
        .map(|raw| Email::parse(&raw))
        .transpose()?;
        let notes = optional_text(self.notes.as_deref(), "notes", MAX_NOTES_CHARS)?;
        let payment_reference =
            optional_text(self.payment_reference.as_deref(), "paymentReference", 200)?;

        let (delivery_address, address_id) = match self.fulfillment_type {
            FulfillmentType::Delivery => {
                let text = delivery_text(self.delivery_address.as_deref())?;
                if text.is_none() && self.address_id.is_none() {
                    return Err(ServiceError::MissingDeliveryAddress);
                }
                (text, self.address_id)
            }
            FulfillmentType::Pickup => (None, None),
        };

        let lines = self
            .items
            .into_iter()
            .map(|line| {
                Ok(ValidLine {
                    product_id: line.product_id,
                    quantity: Quantity::new(line.quantity)?,
                    // Each addition counts once per line.
                    addition_ids: line
                        .addition_ids
                        .into_iter()
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .collect(),
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(ValidCheckout {
            name,
            phone,
            email,
            fulfillment_type: self.fulfillment_type,
            delivery_address,
            address_id,
            notes,
            payment_method: self.payment_method,
            payment_reference,
            lines,
        })
    }
}

/// Priced lines and subtotal.
fn price_lines(
    lines: &[ValidLine],
    catalog: &CatalogSnapshot,
) -> Result<(Vec<NewOrderItem>, Money), ServiceError> {
    let mut items = Vec::with_capacity(lines.len());
    let mut subtotal = Money::ZERO;

    for line in lines {
        let product = catalog
            .product(line.product_id)
            .ok_or(ServiceError::NotFound("product"))?;

        let mut additions = Vec::with_capacity(line.addition_ids.len());
        let mut unit_price = product.price;
        for id in &line.addition_ids {
            let addition = catalog
                .addition(*id)
                .ok_or(ServiceError::NotFound("addition"))?;
            unit_price = unit_price.checked_add(addition.price)?;
            additions.push(NewOrderItemAddition {
                addition_id: addition.id,
                addition_name: addition.name.clone(),
                price: addition.price,
            });
        }

        let line_total = unit_price.checked_mul(line.quantity)?;
        subtotal = subtotal.checked_add(line_total)?;
        items.push(NewOrderItem {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: line.quantity,
            line_total,
            additions,
        });
    }

    Ok((items, subtotal))
}

/// Order pipeline over a store, a business configuration source and a clock.
pub struct OrderService<'a, S, C> {
    store: &'a S,
    config: &'a C,
    clock: &'a dyn Clock,
    utc_offset: FixedOffset,
}

impl<'a, S, C> OrderService<'a, S, C>
where
    S: CatalogStore + CustomerStore + AddressStore + OrderStore,
    C: BusinessConfigProvider,
{
    /// Create the service. `utc_offset` decides the calendar date used in
    /// order numbers.
    #[must_use]
    pub const fn new(
        store: &'a S,
        config: &'a C,
        clock: &'a dyn Clock,
        utc_offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            config,
            clock,
            utc_offset,
        }
    }

    /// Place an order.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation`, `InvalidPhone`, `InvalidEmail`, `Amount`
    ///   for malformed input (nothing read or written)
    /// - `ServiceError::Amount` if the order total overflows
    /// - `ServiceError::BusinessConfig` if the configuration cannot be read
    ///   (no order written)
    /// - `ServiceError::MissingDeliveryAddress` for delivery without an address
    /// - `ServiceError::CatalogUnavailable` if any item cannot be ordered
    /// - `ServiceError::Contention` if numbering keeps conflicting
    /// - `ServiceError::Repository` on storage failure (no order written)
    #[instrument(skip_all, fields(fulfillment = ?request.fulfillment_type))]
    pub async fn place_order(&self, request: PlaceOrder) -> Result<PlacedOrder, ServiceError> {
        let checkout = request.validate()?;

        let resolution = resolve_customer(self.store, &checkout.phone, &checkout.name).await?;
        let customer_id = resolution.customer.id;

        let (address_id, delivery_address) = self.resolve_address(customer_id, &checkout).await?;
        if checkout.fulfillment_type == FulfillmentType::Delivery && delivery_address.is_none() {
            return Err(ServiceError::MissingDeliveryAddress);
        }

        let product_ids: Vec<ProductId> = checkout.lines.iter().map(|l| l.product_id).collect();
        let addition_ids: Vec<AdditionId> = checkout
            .lines
            .iter()
            .flat_map(|l| l.addition_ids.iter().copied())
            .collect();
        let catalog = validate_catalog(self.store, &product_ids, &addition_ids).await?;

        let business = self.config.current().await?;
        let delivery_fee = match checkout.fulfillment_type {
            FulfillmentType::Delivery => business.delivery_fee,
            FulfillmentType::Pickup => Money::ZERO,
        };

        let (items, subtotal) = price_lines(&checkout.lines, &catalog)?;
        let total = subtotal.checked_add(delivery_fee)?;

        let date = self.clock.today(self.utc_offset);
        let order = insert_with_order_number(self.store, date, |order_number| NewOrder {
            order_number,
            customer_id: Some(customer_id),
            customer_name: checkout.name.clone(),
            customer_phone: checkout.phone.clone(),
            customer_email: checkout.email.clone(),
            fulfillment_type: checkout.fulfillment_type,
            address_id,
            delivery_address: delivery_address.clone(),
            subtotal,
            delivery_fee,
            total,
            payment_method: checkout.payment_method,
            payment_reference: checkout.payment_reference.clone(),
            notes: checkout.notes.clone(),
            items: items.clone(),
        })
        .await?;

        info!(
            order_number = %order.order_number,
            customer_id = %customer_id,
            total = %order.total,
            "Order placed"
        );

        Ok(PlacedOrder {
            order,
            customer_created: resolution.created,
            business,
        })
    }

    /// Saved-address resolution (step 3). A saved address of another
    /// customer is ignored; explicit text wins over the saved text.
    async fn resolve_address(
        &self,
        customer_id: CustomerId,
        checkout: &ValidCheckout,
    ) -> Result<(Option<AddressId>, Option<String>), ServiceError> {
        let Some(requested) = checkout.address_id else {
            return Ok((None, checkout.delivery_address.clone()));
        };

        match AddressService::new(self.store)
            .usable_for_checkout(customer_id, requested)
            .await?
        {
            Some(saved) => {
                let text = checkout
                    .delivery_address
                    .clone()
                    .unwrap_or(saved.address);
                Ok((Some(saved.id), Some(text)))
            }
            None => {
                debug!(address_id = %requested, "Ignoring saved address not owned by customer");
                Ok((None, checkout.delivery_address.clone()))
            }
        }
    }

    /// Find an order by id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if it does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, ServiceError> {
        self.store
            .order_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound("order"))
    }

    /// Find an order by its number.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if it does not exist.
    pub async fn get_by_number(&self, number: &OrderNumber) -> Result<Order, ServiceError> {
        self.store
            .order_by_number(number)
            .await?
            .ok_or(ServiceError::NotFound("order"))
    }

    /// List orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, ServiceError> {
        Ok(self.store.list_orders(filter).await?)
    }

    /// Move an order to a new status, stamping the matching timestamp.
    ///
    /// Every transition is accepted; skips and backward moves are logged.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the order does not exist.
    #[instrument(skip(self, change), fields(status = %change.status))]
    pub async fn update_status(
        &self,
        id: OrderId,
        change: StatusChange,
    ) -> Result<Order, ServiceError> {
        let order = self.get(id).await?;

        let kind = order.status.classify(change.status);
        match kind {
            TransitionKind::Skip | TransitionKind::Backward => warn!(
                order_number = %order.order_number,
                from = %order.status,
                to = %change.status,
                ?kind,
                "Unusual status transition"
            ),
            TransitionKind::Forward | TransitionKind::Cancel | TransitionKind::Unchanged => {}
        }

        let updated = self
            .store
            .save_order_status(
                id,
                change.status,
                self.clock.now(),
                change.admin_notes.as_deref(),
            )
            .await?;

        info!(
            order_number = %updated.order_number,
            from = %order.status,
            to = %updated.status,
            "Order status updated"
        );
        Ok(updated)
    }
}
