//! Order pipeline services.
//!
//! # Services
//!
//! - `catalog` - Whole-or-nothing validation of requested products/additions
//! - `customers` - Find-or-create customers by phone (retry on conflict)
//! - `addresses` - Saved addresses with the single-default rule
//! - `order_number` - `ORD-YYYYMMDD-NNN` allocation with retry on conflict
//! - `orders` - Order placement and status transitions
//! - `confirmation` - Confirmation message and WhatsApp link

pub mod addresses;
pub mod catalog;
pub mod clock;
pub mod confirmation;
pub mod customers;
mod error;
mod input;
pub mod order_number;
pub mod orders;

pub use addresses::AddressService;
pub use clock::{Clock, SystemClock};
pub use confirmation::{Confirmation, build_confirmation};
pub use customers::{CustomerLookup, lookup_customer, resolve_customer};
pub use error::{ErrorKind, ServiceError};
pub use orders::{OrderLine, OrderService, PlaceOrder, PlacedOrder, StatusChange};
