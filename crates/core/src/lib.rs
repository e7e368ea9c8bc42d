//! Fogon Core - Domain types library.
//!
//! This crate provides the types shared by every Fogon component:
//! - `server` - Storefront and back-office HTTP API with the order pipeline
//! - `cli` - Command-line tools for migrations, seeding and configuration
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules - no I/O, no database
//! access, no HTTP. Rules that must hold regardless of storage (money
//! arithmetic, phone normalization, order-number format, order status
//! transitions) live here so every caller enforces them the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, money, phones, emails, order
//!   numbers and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
