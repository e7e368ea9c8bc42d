//! In-memory store for service tests.
//!
//! Implements every store trait over a single mutex, which gives the same
//! per-customer serialization and all-or-nothing order inserts as the
//! `PostgreSQL` implementation. Faults can be queued to exercise the retry
//! and rollback paths.

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use fogon_core::{
    AdditionId, AddressId, CategoryId, CustomerId, CustomerRole, CustomerStatus, Money, OrderId,
    OrderItemId, OrderNumber, OrderStatus, Phone, ProductId, StatusTimestamps,
};

use super::{
    AddressStore, BusinessConfig, BusinessConfigError, BusinessConfigProvider, CatalogStore,
    CustomerStore, OrderStore, RepositoryError,
};
use crate::models::address;
use crate::models::{
    Addition, Address, AddressPatch, Customer, NewOrder, Order, OrderFilter, OrderItem,
    OrderItemAddition, Product,
};

#[derive(Debug, Default)]
struct Faults {
    /// Order inserts that fail as if another writer took the number.
    order_number_conflicts: u32,
    /// Customer inserts that lose a race to a concurrent insert.
    customer_insert_races: u32,
    /// Order inserts that fail with a database error.
    order_insert_failures: u32,
}

#[derive(Debug)]
struct State {
    customers: Vec<Customer>,
    addresses: Vec<Address>,
    products: Vec<Product>,
    additions: Vec<Addition>,
    orders: Vec<Order>,
    config: BusinessConfig,
    next_id: i32,
    ticks: i64,
    faults: Faults,
}

impl State {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Strictly increasing timestamps so "newest" is well defined.
    fn now(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0)
            .single()
            .unwrap_or_default()
            + Duration::milliseconds(self.ticks)
    }

    fn insert_customer_row(&mut self, phone: &Phone, name: &str, role: CustomerRole) -> Customer {
        let now = self.now();
        let customer = Customer {
            id: CustomerId::new(self.next_id()),
            phone: phone.clone(),
            name: name.to_owned(),
            email: None,
            role,
            status: CustomerStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.customers.push(customer.clone());
        customer
    }

    fn apply_plan(&mut self, plan: &address::DefaultFlagPlan) {
        for a in &mut self.addresses {
            if plan.clear.contains(&a.id) {
                a.is_default = false;
            }
        }
        if let Some(id) = plan.promote {
            for a in &mut self.addresses {
                if a.id == id {
                    a.is_default = true;
                }
            }
        }
    }

    fn for_customer(&self, customer_id: CustomerId) -> Vec<Address> {
        self.addresses
            .iter()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect()
    }
}

/// In-memory implementation of all store traits.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                customers: Vec::new(),
                addresses: Vec::new(),
                products: Vec::new(),
                additions: Vec::new(),
                orders: Vec::new(),
                config: BusinessConfig {
                    business_name: "Fogon".to_owned(),
                    delivery_fee: Money::new(5_000),
                    whatsapp_number: Phone::parse("+573001234567").ok(),
                },
                next_id: 0,
                ticks: 0,
                faults: Faults::default(),
            }),
        }
    }

    pub async fn add_product(&self, name: &str, price: i64) -> Product {
        let mut state = self.state.lock().await;
        let product = Product {
            id: ProductId::new(state.next_id()),
            category_id: CategoryId::new(1),
            name: name.to_owned(),
            price: Money::new(price),
            description: None,
            image_url: None,
            is_active: true,
            is_available: true,
            display_order: 0,
        };
        state.products.push(product.clone());
        product
    }

    pub async fn add_addition(&self, name: &str, price: i64) -> Addition {
        let mut state = self.state.lock().await;
        let addition = Addition {
            id: AdditionId::new(state.next_id()),
            name: name.to_owned(),
            price: Money::new(price),
            is_active: true,
            display_order: 0,
        };
        state.additions.push(addition.clone());
        addition
    }

    pub async fn set_product_flags(&self, id: ProductId, is_active: bool, is_available: bool) {
        let mut state = self.state.lock().await;
        if let Some(p) = state.products.iter_mut().find(|p| p.id == id) {
            p.is_active = is_active;
            p.is_available = is_available;
        }
    }

    pub async fn set_addition_active(&self, id: AdditionId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(a) = state.additions.iter_mut().find(|a| a.id == id) {
            a.is_active = is_active;
        }
    }

    pub async fn set_product_price(&self, id: ProductId, price: i64) {
        let mut state = self.state.lock().await;
        if let Some(p) = state.products.iter_mut().find(|p| p.id == id) {
            p.price = Money::new(price);
        }
    }

    pub async fn set_delivery_fee(&self, fee: i64) {
        self.state.lock().await.config.delivery_fee = Money::new(fee);
    }

    pub async fn add_customer(&self, phone: &str, name: &str, role: CustomerRole) -> Customer {
        let phone = Phone::parse(phone).unwrap_or_else(|e| panic!("bad test phone: {e}"));
        self.state
            .lock()
            .await
            .insert_customer_row(&phone, name, role)
    }

    /// Insert an order row directly, bypassing numbering.
    pub async fn seed_order_number(&self, number: &str) {
        let mut state = self.state.lock().await;
        let now = state.now();
        let order = Order {
            id: OrderId::new(state.next_id()),
            order_number: OrderNumber::parse(number).unwrap_or_else(|e| panic!("{e}")),
            customer_id: None,
            customer_name: "Seed".to_owned(),
            customer_phone: Phone::parse("3000000000").unwrap_or_else(|e| panic!("{e}")),
            customer_email: None,
            fulfillment_type: fogon_core::FulfillmentType::Pickup,
            address_id: None,
            delivery_address: None,
            subtotal: Money::ZERO,
            delivery_fee: Money::ZERO,
            total: Money::ZERO,
            payment_method: fogon_core::PaymentMethod::Cash,
            payment_reference: None,
            notes: None,
            status: OrderStatus::Pending,
            timestamps: StatusTimestamps::default(),
            admin_notes: None,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        };
        state.orders.push(order);
    }

    pub async fn queue_order_number_conflicts(&self, n: u32) {
        self.state.lock().await.faults.order_number_conflicts = n;
    }

    pub async fn queue_customer_insert_races(&self, n: u32) {
        self.state.lock().await.faults.customer_insert_races = n;
    }

    pub async fn queue_order_insert_failures(&self, n: u32) {
        self.state.lock().await.faults.order_insert_failures = n;
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }

    pub async fn customer_count(&self) -> usize {
        self.state.lock().await.customers.len()
    }

    pub async fn all_addresses(&self) -> Vec<Address> {
        self.state.lock().await.addresses.clone()
    }
}

impl CatalogStore for MemoryStore {
    async fn orderable_products(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id) && p.is_orderable())
            .cloned()
            .collect())
    }

    async fn orderable_additions(
        &self,
        ids: &[AdditionId],
    ) -> Result<Vec<Addition>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .additions
            .iter()
            .filter(|a| ids.contains(&a.id) && a.is_orderable())
            .cloned()
            .collect())
    }
}

impl CustomerStore for MemoryStore {
    async fn customer_by_phone(&self, phone: &Phone) -> Result<Option<Customer>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.customers.iter().find(|c| &c.phone == phone).cloned())
    }

    async fn customer_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_customer(&self, phone: &Phone, name: &str) -> Result<Customer, RepositoryError> {
        let mut state = self.state.lock().await;
        if state.faults.customer_insert_races > 0 {
            state.faults.customer_insert_races -= 1;
            if !state.customers.iter().any(|c| &c.phone == phone) {
                state.insert_customer_row(phone, "Concurrent", CustomerRole::Customer);
            }
            return Err(RepositoryError::Conflict("customers_phone_key".to_owned()));
        }
        if state.customers.iter().any(|c| &c.phone == phone) {
            return Err(RepositoryError::Conflict("customers_phone_key".to_owned()));
        }
        Ok(state.insert_customer_row(phone, name, CustomerRole::Customer))
    }

    async fn update_customer_name(
        &self,
        id: CustomerId,
        name: &str,
    ) -> Result<Customer, RepositoryError> {
        let mut state = self.state.lock().await;
        let now = state.now();
        let customer = state
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;
        name.clone_into(&mut customer.name);
        customer.updated_at = now;
        Ok(customer.clone())
    }
}

impl AddressStore for MemoryStore {
    async fn address_by_id(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn addresses_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Address>, RepositoryError> {
        let state = self.state.lock().await;
        let mut rows = state.for_customer(customer_id);
        address::sort_for_listing(&mut rows);
        Ok(rows)
    }

    async fn insert_address(
        &self,
        customer_id: CustomerId,
        address_text: &str,
        requested_default: bool,
    ) -> Result<Address, RepositoryError> {
        let mut state = self.state.lock().await;
        if !state.customers.iter().any(|c| c.id == customer_id) {
            return Err(RepositoryError::NotFound);
        }
        let existing = state.for_customer(customer_id);
        let (is_default, plan) = address::plan_insert(&existing, requested_default);
        state.apply_plan(&plan);

        let row = Address {
            id: AddressId::new(state.next_id()),
            customer_id,
            address: address_text.to_owned(),
            is_default,
            created_at: state.now(),
        };
        state.addresses.push(row.clone());
        Ok(row)
    }

    async fn update_address(
        &self,
        id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Address, RepositoryError> {
        let mut state = self.state.lock().await;
        let target = state
            .addresses
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?;
        let siblings = state.for_customer(target.customer_id);
        let plan = address::plan_update(&siblings, &target, patch);

        if let Some(text) = &patch.address
            && let Some(row) = state.addresses.iter_mut().find(|a| a.id == id)
        {
            text.clone_into(&mut row.address);
        }
        state.apply_plan(&plan);

        state
            .addresses
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete_address(&self, id: AddressId) -> Result<Address, RepositoryError> {
        let mut state = self.state.lock().await;
        let index = state
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let deleted = state.addresses.remove(index);

        let remaining = state.for_customer(deleted.customer_id);
        let plan = address::plan_delete(&remaining, &deleted);
        state.apply_plan(&plan);

        Ok(deleted)
    }
}

impl OrderStore for MemoryStore {
    async fn latest_order_number(
        &self,
        day_prefix: &str,
    ) -> Result<Option<OrderNumber>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .iter()
            .map(|o| &o.order_number)
            .filter(|n| n.as_str().starts_with(day_prefix))
            .max_by_key(|n| n.sequence())
            .cloned())
    }

    async fn insert_order(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let mut state = self.state.lock().await;

        if state.faults.order_insert_failures > 0 {
            state.faults.order_insert_failures -= 1;
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        if state.faults.order_number_conflicts > 0 {
            state.faults.order_number_conflicts -= 1;
            return Err(RepositoryError::Conflict("orders_order_number_key".to_owned()));
        }
        if state.orders.iter().any(|o| o.order_number == new.order_number) {
            return Err(RepositoryError::Conflict("orders_order_number_key".to_owned()));
        }

        let order_id = OrderId::new(state.next_id());
        let mut items = Vec::with_capacity(new.items.len());
        for (position, item) in (0_i32..).zip(&new.items) {
            let item_id = OrderItemId::new(state.next_id());
            let mut additions = Vec::with_capacity(item.additions.len());
            for a in &item.additions {
                additions.push(OrderItemAddition {
                    id: state.next_id(),
                    order_item_id: item_id,
                    addition_id: Some(a.addition_id),
                    addition_name: a.addition_name.clone(),
                    price: a.price,
                });
            }
            items.push(OrderItem {
                id: item_id,
                order_id,
                product_id: Some(item.product_id),
                product_name: item.product_name.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                line_total: item.line_total,
                position,
                additions,
            });
        }

        let now = state.now();
        let order = Order {
            id: order_id,
            order_number: new.order_number.clone(),
            customer_id: new.customer_id,
            customer_name: new.customer_name.clone(),
            customer_phone: new.customer_phone.clone(),
            customer_email: new.customer_email.clone(),
            fulfillment_type: new.fulfillment_type,
            address_id: new.address_id,
            delivery_address: new.delivery_address.clone(),
            subtotal: new.subtotal,
            delivery_fee: new.delivery_fee,
            total: new.total,
            payment_method: new.payment_method,
            payment_reference: new.payment_reference.clone(),
            notes: new.notes.clone(),
            status: OrderStatus::Pending,
            timestamps: StatusTimestamps::default(),
            admin_notes: None,
            created_at: now,
            updated_at: now,
            items,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn order_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_by_number(
        &self,
        number: &OrderNumber,
    ) -> Result<Option<Order>, RepositoryError> {
        let state = self.state.lock().await;
        Ok(state.orders.iter().find(|o| &o.order_number == number).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .filter(|o| filter.status.is_none_or(|s| o.status == s))
            .filter(|o| filter.date.is_none_or(|d| o.order_number.date() == d))
            .filter(|o| filter.customer_id.is_none_or(|c| o.customer_id == Some(c)))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders.truncate(usize::try_from(filter.limit.clamp(1, OrderFilter::MAX_LIMIT)).unwrap_or(1));
        Ok(orders)
    }

    async fn save_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        stamped_at: DateTime<Utc>,
        admin_notes: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.state.lock().await;
        let now = state.now();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        order.timestamps.stamp(status, stamped_at);
        if let Some(notes) = admin_notes {
            order.admin_notes = Some(notes.to_owned());
        }
        order.updated_at = now;
        Ok(order.clone())
    }
}

impl BusinessConfigProvider for MemoryStore {
    async fn current(&self) -> Result<BusinessConfig, BusinessConfigError> {
        Ok(self.state.lock().await.config.clone())
    }
}
