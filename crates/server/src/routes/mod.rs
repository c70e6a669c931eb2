//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                       - Health check
//!
//! # Auth
//! POST   /auth/register                - Register a customer account
//! POST   /auth/login                   - Login with email and password
//! POST   /auth/guest                   - Create an anonymous guest session
//! POST   /auth/logout                  - Destroy the session
//!
//! # Account (requires auth)
//! GET    /account                      - Current account
//! PATCH  /account                      - Update own profile fields
//! POST   /account/password             - Change own password
//! GET    /account/addresses            - Address list
//! POST   /account/addresses            - Add an address
//! DELETE /account/addresses/{id}       - Remove an own address
//!
//! # Products (reads public, writes staff)
//! GET    /products                     - Listing; ?search=&tags=&available=&sort=
//! GET    /products/{id}                - Product detail
//! POST   /products                     - Create product
//! PATCH  /products/{id}                - Update product fields
//! POST   /products/{id}/tags           - Attach tag
//! DELETE /products/{id}/tags/{name}    - Detach tag
//! POST   /products/{id}/images         - Attach image
//! DELETE /products/{id}/images/{id}    - Detach image
//!
//! # Trolley (requires auth)
//! GET    /trolley                      - Current trolley
//! POST   /trolley                      - Add product
//! PATCH  /trolley                      - Change a product's quantity
//! DELETE /trolley/{line_item_id}       - Remove one line
//! DELETE /trolley                      - Clear
//!
//! # Orders (requires auth)
//! POST   /orders                       - Place order from trolley
//! GET    /orders                       - Order history
//! GET    /orders/{id}                  - Order with frozen lines
//! GET    /orders/{id}/invoice          - Invoice document
//! GET    /orders/{id}/receipt          - Receipt document
//!
//! # Admin (requires administrative role)
//! GET    /admin/accounts               - Filtered account listing
//! POST   /admin/accounts               - Create account with role
//! GET    /admin/accounts/{id}          - Account detail
//! PATCH  /admin/accounts/{id}          - Update account, role/status included
//! POST   /admin/accounts/{id}/password - Set password
//! POST   /admin/accounts/{id}/deactivate - Status -> inactive
//! POST   /admin/accounts/{id}/condemn  - Status -> condemned
//! DELETE /admin/accounts               - Bulk delete
//! GET    /admin/orders                 - Every order, newest first (staff)
//! POST   /admin/reports                - Store an inventory report
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod orders;
pub mod products;
pub mod trolley;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/guest", post(auth::guest))
        .route("/logout", post(auth::logout))
}

/// Create the self-service account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_self).patch(account::update_self))
        .route("/password", post(account::change_password))
        .route(
            "/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route("/addresses/{id}", delete(account::delete_address))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/{id}", get(products::get).patch(products::update))
        .route("/{id}/tags", post(products::add_tag))
        .route("/{id}/tags/{name}", delete(products::remove_tag))
        .route("/{id}/images", post(products::add_image))
        .route("/{id}/images/{image_id}", delete(products::remove_image))
}

/// Create the trolley routes router.
pub fn trolley_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(trolley::get)
                .post(trolley::add)
                .patch(trolley::change_quantity)
                .delete(trolley::clear),
        )
        .route("/{line_item_id}", delete(trolley::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::get))
        .route("/{id}/invoice", get(orders::invoice))
        .route("/{id}/receipt", get(orders::receipt))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts",
            get(admin::list_accounts)
                .post(admin::create_account)
                .delete(admin::delete_accounts),
        )
        .route(
            "/accounts/{id}",
            get(admin::get_account).patch(admin::update_account),
        )
        .route("/accounts/{id}/password", post(admin::set_password))
        .route("/accounts/{id}/deactivate", post(admin::deactivate_account))
        .route("/accounts/{id}/condemn", post(admin::condemn_account))
        .route("/orders", get(admin::list_orders))
        .route("/reports", post(admin::create_report))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
        .nest("/products", product_routes())
        .nest("/trolley", trolley_routes())
        .nest("/orders", order_routes())
        .nest("/admin", admin_routes())
}
