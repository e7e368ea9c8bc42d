//! Saved delivery addresses and the single-default rule.
//!
//! A customer with at least one address has exactly one default. The
//! functions here compute which default flags must change for each
//! mutation; stores apply the resulting [`DefaultFlagPlan`] inside the same
//! per-customer critical section that reads the current addresses, clearing
//! before setting so no reader ever sees two defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fogon_core::{AddressId, CustomerId};

/// A saved address owned by exactly one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub customer_id: CustomerId,
    pub address: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update of an address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub address: Option<String>,
    pub is_default: Option<bool>,
}

/// Default-flag changes required by one address mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultFlagPlan {
    /// Addresses whose default flag must be cleared first.
    pub clear: Vec<AddressId>,
    /// Address that becomes the default afterwards, if any.
    pub promote: Option<AddressId>,
}

impl DefaultFlagPlan {
    /// Returns `true` if no flag changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clear.is_empty() && self.promote.is_none()
    }
}

/// Ids of the current defaults among `addresses`, excluding `except`.
fn current_defaults(addresses: &[Address], except: Option<AddressId>) -> Vec<AddressId> {
    addresses
        .iter()
        .filter(|a| a.is_default && Some(a.id) != except)
        .map(|a| a.id)
        .collect()
}

/// Whether a new address is inserted as default, and which defaults to
/// clear before inserting it.
///
/// The first address of a customer is always the default, whatever was
/// requested.
#[must_use]
pub fn plan_insert(existing: &[Address], requested_default: bool) -> (bool, DefaultFlagPlan) {
    let is_default = requested_default || existing.is_empty();
    let clear = if is_default {
        current_defaults(existing, None)
    } else {
        Vec::new()
    };
    (
        is_default,
        DefaultFlagPlan {
            clear,
            promote: None,
        },
    )
}

/// Flag changes for patching `target` with `patch`.
///
/// Setting `isDefault = true` moves the default to `target`. Clearing the
/// flag on the current default is ignored: the default only moves when
/// another address is made default or the default is deleted.
#[must_use]
pub fn plan_update(siblings: &[Address], target: &Address, patch: &AddressPatch) -> DefaultFlagPlan {
    if patch.is_default != Some(true) {
        return DefaultFlagPlan::default();
    }
    DefaultFlagPlan {
        clear: current_defaults(siblings, Some(target.id)),
        promote: (!target.is_default).then_some(target.id),
    }
}

/// Flag changes after deleting `deleted`, given the addresses that remain.
///
/// If the deleted address was the default, the most recently created
/// remaining address is promoted. No addresses left means no default.
#[must_use]
pub fn plan_delete(remaining: &[Address], deleted: &Address) -> DefaultFlagPlan {
    if !deleted.is_default || remaining.iter().any(|a| a.is_default) {
        return DefaultFlagPlan::default();
    }
    DefaultFlagPlan {
        clear: Vec::new(),
        promote: newest(remaining).map(|a| a.id),
    }
}

/// Most recently created address; ties go to the higher id.
fn newest(addresses: &[Address]) -> Option<&Address> {
    addresses.iter().max_by_key(|a| (a.created_at, a.id))
}

/// Sort for display: default first, then newest first.
pub fn sort_for_listing(addresses: &mut [Address]) {
    addresses.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });
}
