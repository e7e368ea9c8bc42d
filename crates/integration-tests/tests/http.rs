//! HTTP smoke tests against a running `fogon-server`.
//!
//! These tests require:
//! - A migrated database (`fogon-cli migrate`) at `FOGON_TEST_DATABASE_URL`
//! - The server running against it at `FOGON_TEST_BASE_URL`

#![allow(clippy::unwrap_used)]

use fogon_integration_tests::{base_url, insert_product, test_pool, unique_phone};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running server and FOGON_TEST_DATABASE_URL"]
async fn test_health_endpoints() {
    let client = Client::new();

    let resp = client.get(format!("{}/health", base_url())).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server and FOGON_TEST_DATABASE_URL"]
async fn test_place_and_fetch_order() {
    let pool = test_pool().await;
    let product = insert_product(&pool, "Empanada", 3_500).await;
    let phone = unique_phone();
    let client = Client::new();

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "customerName": "Eva",
            "customerPhone": phone.as_str(),
            "fulfillmentType": "delivery",
            "deliveryAddress": "Calle 10 # 5-20",
            "paymentMethod": "transfer",
            "paymentReference": "TRX-1",
            "items": [{ "productId": product.as_i32(), "quantity": 3 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["customerCreated"], true);
    assert_eq!(body["order"]["subtotal"], 10_500);
    let order_number = body["order"]["orderNumber"].as_str().unwrap().to_owned();
    assert!(order_number.starts_with("ORD-"));
    assert!(
        body["confirmation"]["message"]
            .as_str()
            .unwrap()
            .contains(&order_number)
    );

    let resp = client
        .get(format!("{}/api/orders/{order_number}", base_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["items"][0]["productName"], "Empanada");

    // The checkout created the customer and saved nothing else.
    let resp = client
        .get(format!("{}/api/customers/lookup?phone={phone}", base_url()))
        .send()
        .await
        .unwrap();
    let lookup: Value = resp.json().await.unwrap();
    assert_eq!(lookup["exists"], true);
    assert_eq!(lookup["name"], "Eva");
}

#[tokio::test]
#[ignore = "Requires running server and FOGON_TEST_DATABASE_URL"]
async fn test_unavailable_product_is_rejected() {
    let pool = test_pool().await;
    let product = insert_product(&pool, "Tamal", 9_000).await;
    sqlx::query("UPDATE fogon.products SET is_available = FALSE WHERE id = $1")
        .bind(product.as_i32())
        .execute(&pool)
        .await
        .unwrap();

    let resp = Client::new()
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "customerName": "Fer",
            "customerPhone": unique_phone().as_str(),
            "fulfillmentType": "pickup",
            "paymentMethod": "cash",
            "items": [{ "productId": product.as_i32(), "quantity": 1 }]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["unavailableProducts"], json!([product.as_i32()]));
}
