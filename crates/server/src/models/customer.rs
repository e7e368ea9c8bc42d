//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fogon_core::{CustomerId, CustomerRole, CustomerStatus, Email, Phone};

/// A customer, identified by a normalized phone number.
///
/// Customers exist with or without credentials: a phone-only checkout
/// creates one implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub phone: Phone,
    pub name: String,
    pub email: Option<Email>,
    pub role: CustomerRole,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of resolving a customer by phone.
///
/// Creating a customer during checkout is a normal branch, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerResolution {
    pub customer: Customer,
    /// `true` if this call inserted the customer.
    pub created: bool,
}
