//! Session-carried caller identity.
//!
//! Sessions are issued by the authentication service; this crate only reads
//! the identity it stored.

use serde::{Deserialize, Serialize};

use fogon_core::{CustomerId, CustomerRole};

/// Session keys.
pub mod session_keys {
    /// Key under which the authenticated caller is stored.
    pub const CURRENT_USER: &str = "current_user";
}

/// The resolved caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub customer_id: CustomerId,
    pub name: String,
    pub role: CustomerRole,
}
