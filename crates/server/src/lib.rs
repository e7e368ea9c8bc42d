//! Fogon ordering server library.
//!
//! The order pipeline (catalog validation, customer resolution, address
//! reconciliation, order numbering, order assembly and status changes) and
//! the HTTP surface around it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
