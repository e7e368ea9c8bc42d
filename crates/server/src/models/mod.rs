//! Domain models for the ordering platform.
//!
//! Rows are decoded straight into these types (`sqlx::FromRow`) and the same
//! types are serialized in API responses (camelCase).

pub mod address;
pub mod catalog;
pub mod customer;
pub mod order;
pub mod session;

pub use address::{Address, AddressPatch, DefaultFlagPlan};
pub use catalog::{Addition, Product};
pub use customer::{Customer, CustomerResolution};
pub use order::{
    NewOrder, NewOrderItem, NewOrderItemAddition, Order, OrderItem, OrderItemAddition,
    OrderFilter,
};
pub use session::{CurrentUser, session_keys};
