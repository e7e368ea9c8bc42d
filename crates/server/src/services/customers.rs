//! Customer resolution by phone.
//!
//! The `UNIQUE(phone)` constraint is the authority: when two requests race
//! to create the same customer, the loser sees a conflict, re-reads and
//! continues with the winner's row.

use tracing::{debug, info, instrument, warn};

use fogon_core::Phone;

use super::ServiceError;
use crate::db::{AddressStore, CustomerStore, RepositoryError};
use crate::models::{Address, Customer, CustomerResolution};

/// Attempts before a phone conflict is reported as contention.
pub const MAX_RESOLVE_ATTEMPTS: u32 = 3;

/// Find or create the customer for `phone`, updating the stored name if the
/// caller supplied a different one.
///
/// # Errors
///
/// Returns `ServiceError::Contention` if creation keeps conflicting, or
/// `ServiceError::Repository` on storage failure.
#[instrument(skip(store, name), fields(phone = %phone))]
pub async fn resolve_customer<S: CustomerStore>(
    store: &S,
    phone: &Phone,
    name: &str,
) -> Result<CustomerResolution, ServiceError> {
    for attempt in 1..=MAX_RESOLVE_ATTEMPTS {
        if let Some(customer) = store.customer_by_phone(phone).await? {
            let customer = if customer.name == name {
                customer
            } else {
                debug!(customer_id = %customer.id, "Updating customer name");
                store.update_customer_name(customer.id, name).await?
            };
            return Ok(CustomerResolution {
                customer,
                created: false,
            });
        }

        match store.insert_customer(phone, name).await {
            Ok(customer) => {
                info!(customer_id = %customer.id, "Customer created");
                return Ok(CustomerResolution {
                    customer,
                    created: true,
                });
            }
            Err(RepositoryError::Conflict(constraint)) => {
                warn!(attempt, %constraint, "Concurrent customer creation, re-reading");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ServiceError::Contention("customer"))
}

/// A customer known by phone, with saved addresses for checkout prefill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerLookup {
    pub customer: Customer,
    pub addresses: Vec<Address>,
}

/// Look up a customer by phone without creating one.
///
/// # Errors
///
/// Returns `ServiceError::Repository` on storage failure.
pub async fn lookup_customer<S>(
    store: &S,
    phone: &Phone,
) -> Result<Option<CustomerLookup>, ServiceError>
where
    S: CustomerStore + AddressStore,
{
    let Some(customer) = store.customer_by_phone(phone).await? else {
        return Ok(None);
    };
    let addresses = store.addresses_for_customer(customer.id).await?;
    Ok(Some(CustomerLookup {
        customer,
        addresses,
    }))
}
