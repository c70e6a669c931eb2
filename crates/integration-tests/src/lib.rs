//! Integration test helpers for the AWE Electronics store.
//!
//! # Running Tests
//!
//! ```bash
//! # Start MariaDB and apply migrations
//! cargo run -p awe-electronics-cli -- migrate
//!
//! # Bootstrap a staff account the tests can use
//! cargo run -p awe-electronics-cli -- admin create \
//!     -e admin@test.invalid -p 'Adm1n!pass' -r admin
//!
//! # Start the server, then run the ignored tests
//! cargo run -p awe-electronics-server &
//! cargo test -p awe-electronics-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `AWE_BASE_URL` - Server URL (default `http://localhost:3000`)
//! - `AWE_TEST_ADMIN_EMAIL` / `AWE_TEST_ADMIN_PASSWORD` - Staff credentials
//!   (defaults match the bootstrap command above)
//! - `AWE_DATABASE_URL` - Only needed by tests that inspect rows directly

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("AWE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A fresh HTTP client with its own cookie jar, so each logical actor in a
/// test holds an independent session.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Register a new customer with a unique email and leave the client logged
/// in as it. Returns the account body.
///
/// # Panics
///
/// Panics if registration does not return 201.
pub async fn register_customer(client: &Client) -> Value {
    let email = format!("customer_{}@test.invalid", Uuid::new_v4().simple());
    let resp = client
        .post(format!("{}/auth/register", base_url()))
        .json(&json!({ "email": email, "password": "Cust0mer!pass" }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), 201, "registration failed");

    resp.json().await.expect("Failed to parse account body")
}

/// Log the client in as the bootstrap staff account.
///
/// # Panics
///
/// Panics if the login fails; see the module docs for the bootstrap step.
pub async fn login_admin(client: &Client) {
    let email = std::env::var("AWE_TEST_ADMIN_EMAIL")
        .unwrap_or_else(|_| "admin@test.invalid".to_string());
    let password =
        std::env::var("AWE_TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "Adm1n!pass".to_string());

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to login admin");
    assert_eq!(resp.status(), 200, "admin login failed; was it bootstrapped?");
}

/// Create an address for the logged-in client and return its id.
///
/// # Panics
///
/// Panics if the request does not return 201.
pub async fn create_address(client: &Client) -> i64 {
    let resp = client
        .post(format!("{}/account/addresses", base_url()))
        .json(&json!({ "location": "1 Test Street, Melbourne VIC 3000" }))
        .send()
        .await
        .expect("Failed to create address");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("Failed to parse address body");
    body["id"].as_i64().expect("address id missing")
}

/// Create a product as staff and return its id. `price` is a decimal string
/// such as `"29.95"`.
///
/// # Panics
///
/// Panics if the request does not return 201.
pub async fn create_product(staff: &Client, name: &str, price: &str, available: i32) -> i64 {
    let resp = staff
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": format!("{name} {}", Uuid::new_v4().simple()),
            "description": "integration test product",
            "price": price,
            "stock": available,
            "available": available,
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), 201, "product creation failed");

    let body: Value = resp.json().await.expect("Failed to parse product body");
    body["product_id"].as_i64().expect("product_id missing")
}

/// Add a product to the logged-in client's trolley. Returns the response
/// status without asserting, so failure cases can test it.
///
/// # Panics
///
/// Panics only if the request itself cannot be sent.
pub async fn add_to_trolley(client: &Client, product_id: i64, quantity: i32) -> reqwest::Response {
    client
        .post(format!("{}/trolley", base_url()))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to post to trolley")
}

/// Fetch the logged-in client's trolley as JSON.
///
/// # Panics
///
/// Panics if the request does not return 200.
pub async fn get_trolley(client: &Client) -> Value {
    let resp = client
        .get(format!("{}/trolley", base_url()))
        .send()
        .await
        .expect("Failed to get trolley");
    assert_eq!(resp.status(), 200);

    resp.json().await.expect("Failed to parse trolley body")
}
