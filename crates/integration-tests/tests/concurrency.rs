//! Concurrency properties that only the database can enforce.
//!
//! Run with: `cargo test -p fogon-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::FixedOffset;
use fogon_core::{FulfillmentType, OrderStatus, PaymentMethod};
use fogon_integration_tests::{insert_product, test_pool, unique_phone};
use fogon_server::db::{AddressStore, OrderStore, PgRepository};
use fogon_server::services::{
    AddressService, OrderLine, OrderService, PlaceOrder, StatusChange, SystemClock,
    resolve_customer,
};

#[tokio::test]
#[ignore = "Requires FOGON_TEST_DATABASE_URL"]
async fn test_concurrent_resolution_creates_one_customer() {
    let pool = test_pool().await;
    let repo = PgRepository::new(pool.clone());
    let phone = unique_phone();

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let repo = repo.clone();
            let phone = phone.clone();
            tokio::spawn(async move { resolve_customer(&repo, &phone, &format!("Ana {i}")).await })
        })
        .collect();

    let mut ids = HashSet::new();
    let mut created = 0;
    for task in tasks {
        let resolution = task.await.unwrap().unwrap();
        ids.insert(resolution.customer.id);
        if resolution.created {
            created += 1;
        }
    }

    assert_eq!(ids.len(), 1, "every caller must see the same customer");
    assert_eq!(created, 1, "exactly one caller creates the customer");

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fogon.customers WHERE phone = $1")
        .bind(&phone)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "Requires FOGON_TEST_DATABASE_URL"]
async fn test_concurrent_address_inserts_keep_one_default() {
    let pool = test_pool().await;
    let repo = PgRepository::new(pool.clone());
    let customer_id = resolve_customer(&repo, &unique_phone(), "Beto")
        .await
        .unwrap()
        .customer
        .id;

    // Half of them ask to become the default; none of them sees the others.
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let repo = repo.clone();
            tokio::spawn(async move {
                AddressService::new(&repo)
                    .create(customer_id, &format!("Calle {i} # 1-2"), i % 2 == 0)
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let addresses = repo.addresses_for_customer(customer_id).await.unwrap();
    assert_eq!(addresses.len(), 8);
    assert_eq!(addresses.iter().filter(|a| a.is_default).count(), 1);
    assert!(addresses[0].is_default, "default is listed first");
}

#[tokio::test]
#[ignore = "Requires FOGON_TEST_DATABASE_URL"]
async fn test_deleting_default_promotes_newest() {
    let pool = test_pool().await;
    let repo = PgRepository::new(pool);
    let customer = resolve_customer(&repo, &unique_phone(), "Caro")
        .await
        .unwrap()
        .customer;
    let service = AddressService::new(&repo);

    let first = service.create(customer.id, "Carrera 1", false).await.unwrap();
    let _second = service.create(customer.id, "Carrera 2", false).await.unwrap();
    let third = service.create(customer.id, "Carrera 3", false).await.unwrap();
    assert!(first.is_default, "first address is forced default");

    service.delete(customer.id, first.id).await.unwrap();

    let addresses = repo.addresses_for_customer(customer.id).await.unwrap();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].id, third.id);
    assert!(addresses[0].is_default);
    assert!(!addresses[1].is_default);
}

#[tokio::test]
#[ignore = "Requires FOGON_TEST_DATABASE_URL"]
async fn test_concurrent_orders_get_unique_numbers() {
    let pool = test_pool().await;
    let repo = PgRepository::new(pool);
    let product = insert_product(repo.pool(), "Arepa de queso", 7_000).await;
    let utc = FixedOffset::east_opt(0).unwrap();

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move {
                let request = PlaceOrder {
                    customer_name: "Dani".to_owned(),
                    customer_phone: unique_phone().to_string(),
                    customer_email: None,
                    fulfillment_type: FulfillmentType::Pickup,
                    delivery_address: None,
                    address_id: None,
                    notes: None,
                    payment_method: PaymentMethod::Cash,
                    payment_reference: None,
                    items: vec![OrderLine {
                        product_id: product,
                        quantity: 2,
                        addition_ids: Vec::new(),
                    }],
                };
                OrderService::new(&repo, &repo, &SystemClock, utc)
                    .place_order(request)
                    .await
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    for task in tasks {
        let placed = task.await.unwrap().unwrap();
        assert_eq!(placed.order.total.as_i64(), 14_000);
        assert!(placed.order.pricing_is_consistent());
        numbers.insert(placed.order.order_number.to_string());
    }
    assert_eq!(numbers.len(), 5, "order numbers must be unique");
}

#[tokio::test]
#[ignore = "Requires FOGON_TEST_DATABASE_URL"]
async fn test_concurrent_status_updates_keep_every_stamp() {
    let pool = test_pool().await;
    let repo = PgRepository::new(pool);
    let product = insert_product(repo.pool(), "Empanada", 3_000).await;
    let utc = FixedOffset::east_opt(0).unwrap();

    let request = PlaceOrder {
        customer_name: "Eva".to_owned(),
        customer_phone: unique_phone().to_string(),
        customer_email: None,
        fulfillment_type: FulfillmentType::Pickup,
        delivery_address: None,
        address_id: None,
        notes: None,
        payment_method: PaymentMethod::Cash,
        payment_reference: None,
        items: vec![OrderLine {
            product_id: product,
            quantity: 1,
            addition_ids: Vec::new(),
        }],
    };
    let order_id = OrderService::new(&repo, &repo, &SystemClock, utc)
        .place_order(request)
        .await
        .unwrap()
        .order
        .id;

    let tasks: Vec<_> = [OrderStatus::Confirmed, OrderStatus::Preparing, OrderStatus::Ready]
        .into_iter()
        .map(|status| {
            let repo = repo.clone();
            tokio::spawn(async move {
                OrderService::new(&repo, &repo, &SystemClock, utc)
                    .update_status(
                        order_id,
                        StatusChange {
                            status,
                            admin_notes: None,
                        },
                    )
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = repo.order_by_id(order_id).await.unwrap().unwrap();
    assert!(stored.timestamps.confirmed_at.is_some());
    assert!(stored.timestamps.preparing_at.is_some());
    assert!(stored.timestamps.ready_at.is_some());
}
