//! Core types for Fogon.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order_number;
pub mod phone;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError, Quantity};
pub use order_number::{OrderNumber, OrderNumberError};
pub use phone::{Phone, PhoneError};
pub use status::*;
