//! Saved addresses of the calling customer.
//!
//! Ownership is checked here; the single-default rule is applied by the
//! store inside its per-customer critical section.

use tracing::{info, instrument, warn};

use fogon_core::{AddressId, CustomerId};

use super::ServiceError;
use super::input::{MAX_ADDRESS_CHARS, optional_text, required_text};
use crate::db::AddressStore;
use crate::models::{Address, AddressPatch};

/// Address operations on behalf of one customer.
pub struct AddressService<'a, S> {
    store: &'a S,
}

impl<'a, S: AddressStore> AddressService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The customer's addresses, default first, then newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn list(&self, customer_id: CustomerId) -> Result<Vec<Address>, ServiceError> {
        Ok(self.store.addresses_for_customer(customer_id).await?)
    }

    /// Add an address. The customer's first address is always the default.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the text is blank or too long.
    #[instrument(skip(self, address))]
    pub async fn create(
        &self,
        customer_id: CustomerId,
        address: &str,
        is_default: bool,
    ) -> Result<Address, ServiceError> {
        let address = required_text(address, "address", MAX_ADDRESS_CHARS)?;
        let created = self
            .store
            .insert_address(customer_id, &address, is_default)
            .await?;
        info!(address_id = %created.id, is_default = created.is_default, "Address created");
        Ok(created)
    }

    /// Patch one of the customer's addresses.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the address does not exist and
    /// `ServiceError::Forbidden` if it belongs to another customer.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
        patch: AddressPatch,
    ) -> Result<Address, ServiceError> {
        self.owned(customer_id, address_id).await?;

        let patch = AddressPatch {
            address: match patch.address {
                Some(text) => Some(required_text(&text, "address", MAX_ADDRESS_CHARS)?),
                None => None,
            },
            is_default: patch.is_default,
        };
        Ok(self.store.update_address(address_id, &patch).await?)
    }

    /// Delete one of the customer's addresses. If it was the default, the
    /// newest remaining address becomes the default.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the address does not exist and
    /// `ServiceError::Forbidden` if it belongs to another customer.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<Address, ServiceError> {
        self.owned(customer_id, address_id).await?;
        let deleted = self.store.delete_address(address_id).await?;
        info!(was_default = deleted.is_default, "Address deleted");
        Ok(deleted)
    }

    /// Resolve a saved address for checkout: `None` unless it exists and
    /// belongs to `customer_id`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    pub async fn usable_for_checkout(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<Option<Address>, ServiceError> {
        let address = self.store.address_by_id(address_id).await?;
        Ok(address.filter(|a| a.customer_id == customer_id))
    }

    async fn owned(
        &self,
        customer_id: CustomerId,
        address_id: AddressId,
    ) -> Result<Address, ServiceError> {
        let address = self
            .store
            .address_by_id(address_id)
            .await?
            .ok_or(ServiceError::NotFound("address"))?;
        if address.customer_id != customer_id {
            warn!(owner = %address.customer_id, "Address belongs to another customer");
            return Err(ServiceError::Forbidden);
        }
        Ok(address)
    }
}

/// Normalize an optional free-text delivery address.
pub(crate) fn delivery_text(value: Option<&str>) -> Result<Option<String>, ServiceError> {
    optional_text(value, "deliveryAddress", MAX_ADDRESS_CHARS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fogon_core::CustomerRole;

    use super::*;
    use crate::db::memory::MemoryStore;

    async fn customer(store: &MemoryStore, phone: &str) -> CustomerId {
        store.add_customer(phone, "Ana", CustomerRole::Customer).await.id
    }

    fn defaults(addresses: &[Address], customer_id: CustomerId) -> usize {
        addresses
            .iter()
            .filter(|a| a.customer_id == customer_id && a.is_default)
            .count()
    }

    fn make_default() -> AddressPatch {
        AddressPatch {
            address: None,
            is_default: Some(true),
        }
    }

    #[tokio::test]
    async fn test_first_address_forced_default() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let first = service.create(ana, "Calle 10 # 5-20", false).await.unwrap();

        assert!(first.is_default);
    }

    #[tokio::test]
    async fn test_new_default_replaces_old_one() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let home = service.create(ana, "Casa", false).await.unwrap();
        let work = service.create(ana, "Oficina", true).await.unwrap();

        let list = service.list(ana).await.unwrap();
        assert_eq!(defaults(&list, ana), 1);
        assert_eq!(list[0].id, work.id);
        assert!(!list.iter().find(|a| a.id == home.id).unwrap().is_default);
    }

    #[tokio::test]
    async fn test_list_is_default_first_then_newest() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let a = service.create(ana, "A", false).await.unwrap();
        let b = service.create(ana, "B", false).await.unwrap();
        let c = service.create(ana, "C", false).await.unwrap();

        let ids: Vec<AddressId> = service.list(ana).await.unwrap().iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, c.id, b.id]);
    }

    #[tokio::test]
    async fn test_update_moves_default() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        service.create(ana, "Casa", false).await.unwrap();
        let work = service.create(ana, "Oficina", false).await.unwrap();

        let updated = service.update(ana, work.id, make_default()).await.unwrap();

        assert!(updated.is_default);
        assert_eq!(defaults(&store.all_addresses().await, ana), 1);
    }

    #[tokio::test]
    async fn test_update_text_only_keeps_flags() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let home = service.create(ana, "Casa", false).await.unwrap();
        let patch = AddressPatch {
            address: Some("  Casa nueva ".to_owned()),
            is_default: Some(false),
        };
        let updated = service.update(ana, home.id, patch).await.unwrap();

        assert_eq!(updated.address, "Casa nueva");
        assert!(updated.is_default);
    }

    #[tokio::test]
    async fn test_delete_default_promotes_remaining() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let home = service.create(ana, "Casa", false).await.unwrap();
        let work = service.create(ana, "Oficina", false).await.unwrap();

        service.delete(ana, home.id).await.unwrap();

        let list = service.list(ana).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, work.id);
        assert!(list[0].is_default);
    }

    #[tokio::test]
    async fn test_delete_last_address_leaves_empty_set() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let home = service.create(ana, "Casa", true).await.unwrap();
        service.delete(ana, home.id).await.unwrap();

        assert!(service.list(ana).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_customers_address_is_forbidden() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let luis = customer(&store, "3109876543").await;
        let service = AddressService::new(&store);

        let home = service.create(ana, "Casa", false).await.unwrap();

        assert!(matches!(
            service.delete(luis, home.id).await.unwrap_err(),
            ServiceError::Forbidden
        ));
        assert!(matches!(
            service.update(luis, home.id, make_default()).await.unwrap_err(),
            ServiceError::Forbidden
        ));
        assert!(matches!(
            service.delete(ana, AddressId::new(404)).await.unwrap_err(),
            ServiceError::NotFound("address")
        ));
        assert_eq!(service.list(ana).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_single_default_holds_across_mixed_operations() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        let mut ids = Vec::new();
        for (i, requested) in [false, true, false, true, false].into_iter().enumerate() {
            ids.push(service.create(ana, &format!("Dir {i}"), requested).await.unwrap().id);
            assert_eq!(defaults(&store.all_addresses().await, ana), 1);
        }
        service.update(ana, ids[0], make_default()).await.unwrap();
        assert_eq!(defaults(&store.all_addresses().await, ana), 1);

        for id in [ids[0], ids[3], ids[1]] {
            service.delete(ana, id).await.unwrap();
            assert_eq!(defaults(&store.all_addresses().await, ana), 1);
        }
    }

    #[tokio::test]
    async fn test_blank_address_rejected() {
        let store = MemoryStore::new();
        let ana = customer(&store, "3001234567").await;
        let service = AddressService::new(&store);

        assert!(matches!(
            service.create(ana, "   ", false).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
