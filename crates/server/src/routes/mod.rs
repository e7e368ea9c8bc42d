//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Storefront (public)
//! POST   /api/orders                        - Place an order (201)
//! GET    /api/orders/{orderNumber}          - Order confirmation lookup
//! GET    /api/customers/lookup?phone=       - Checkout prefill
//!
//! # Account (requires session)
//! GET    /api/account/addresses             - Saved addresses
//! POST   /api/account/addresses             - Add an address
//! PATCH  /api/account/addresses/{id}        - Edit an address
//! DELETE /api/account/addresses/{id}        - Delete an address
//! GET    /api/account/orders                - Order history
//!
//! # Back-office (requires staff role)
//! GET    /admin/api/orders                  - Order list (?status=&date=&limit=)
//! GET    /admin/api/orders/{id}             - Order detail
//! PATCH  /admin/api/orders/{id}/status      - Status transition
//! ```

pub mod account;
pub mod admin;
pub mod customers;
pub mod orders;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Public storefront routes.
pub fn storefront_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::place))
        .route("/orders/{order_number}", get(orders::show))
        .route("/customers/lookup", get(customers::lookup))
}

/// Routes for the signed-in customer.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route(
            "/addresses/{id}",
            patch(account::update_address).delete(account::delete_address),
        )
        .route("/orders", get(account::orders))
}

/// Back-office routes.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::list_orders))
        .route("/orders/{id}", get(admin::show_order))
        .route("/orders/{id}/status", patch(admin::update_status))
}

/// Create the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", storefront_routes())
        .nest("/api/account", account_routes())
        .nest("/admin/api", admin_routes())
}
