//! Integration tests for transactional order placement.
//!
//! These tests require a running server and a migrated MariaDB database;
//! see the crate docs for the bootstrap steps.

use awe_electronics_integration_tests::{
    add_to_trolley, base_url, client, create_address, create_product, get_trolley, login_admin,
    register_customer,
};
use serde_json::{Value, json};

async fn place_order(customer: &reqwest::Client, address_id: i64) -> reqwest::Response {
    customer
        .post(format!("{}/orders", base_url()))
        .json(&json!({ "address_id": address_id }))
        .send()
        .await
        .expect("Failed to post order")
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_order_consumes_trolley_and_freezes_prices() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Checkout Test", "19.99", 20).await;

    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;
    assert_eq!(add_to_trolley(&customer, product_id, 2).await.status(), 201);

    let resp = place_order(&customer, address_id).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let order_id = body["order_id"].as_i64().expect("order_id");

    // Trolley fully consumed
    assert!(get_trolley(&customer).await.as_array().is_some_and(Vec::is_empty));

    // The catalogue price changes after the sale...
    let resp = staff
        .patch(format!("{}/products/{product_id}", base_url()))
        .json(&json!({ "price": "99.99" }))
        .send()
        .await
        .expect("Failed to update price");
    assert_eq!(resp.status(), 204);

    // ...but the order keeps the price at sale time
    let resp = customer
        .get(format!("{}/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), 200);
    let order: Value = resp.json().await.expect("order body");
    let items = order["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["price_at_sale"], "19.99");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(order["total"], "39.98");
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_order_decrements_availability() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Availability Test", "4.00", 10).await;

    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;
    assert_eq!(add_to_trolley(&customer, product_id, 4).await.status(), 201);
    assert_eq!(place_order(&customer, address_id).await.status(), 201);

    let resp = customer
        .get(format!("{}/products/{product_id}", base_url()))
        .send()
        .await
        .expect("Failed to get product");
    let product: Value = resp.json().await.expect("product body");
    assert_eq!(product["available"], 6);
    // Physical stock is untouched until fulfilment
    assert_eq!(product["stock"], 10);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_insufficient_stock_rolls_back_everything() {
    let staff = client();
    login_admin(&staff).await;
    let scarce = create_product(&staff, "Scarce", "1.00", 1).await;
    let plenty = create_product(&staff, "Plenty", "1.00", 100).await;

    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;
    assert_eq!(add_to_trolley(&customer, plenty, 5).await.status(), 201);
    assert_eq!(add_to_trolley(&customer, scarce, 2).await.status(), 201);

    let resp = place_order(&customer, address_id).await;
    assert_eq!(resp.status(), 422);

    // Nothing happened: trolley intact, no availability consumed anywhere
    assert_eq!(get_trolley(&customer).await.as_array().expect("array").len(), 2);
    let resp = customer
        .get(format!("{}/products/{plenty}", base_url()))
        .send()
        .await
        .expect("Failed to get product");
    let product: Value = resp.json().await.expect("product body");
    assert_eq!(product["available"], 100);

    let resp = customer
        .get(format!("{}/orders", base_url()))
        .send()
        .await
        .expect("Failed to list orders");
    let orders: Value = resp.json().await.expect("orders body");
    assert!(orders.as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_empty_trolley_cannot_checkout() {
    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;

    let resp = place_order(&customer, address_id).await;
    assert_eq!(resp.status(), 422);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_foreign_address_rejected() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Address Test", "6.00", 10).await;

    let other = client();
    register_customer(&other).await;
    let foreign_address = create_address(&other).await;

    let customer = client();
    register_customer(&customer).await;
    assert_eq!(add_to_trolley(&customer, product_id, 1).await.status(), 201);

    let resp = place_order(&customer, foreign_address).await;
    assert_eq!(resp.status(), 422);
    assert_eq!(get_trolley(&customer).await.as_array().expect("array").len(), 1);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_orders_are_private_and_documents_exist() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Privacy Test", "12.50", 10).await;

    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;
    assert_eq!(add_to_trolley(&customer, product_id, 1).await.status(), 201);

    let resp = place_order(&customer, address_id).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let order_id = body["order_id"].as_i64().expect("order_id");

    // Invoice and receipt were written at placement
    for document in ["invoice", "receipt"] {
        let resp = customer
            .get(format!("{}/orders/{order_id}/{document}", base_url()))
            .send()
            .await
            .expect("Failed to get document");
        assert_eq!(resp.status(), 200, "{document} missing");
        let payload: Value = resp.json().await.expect("document json");
        assert_eq!(payload["kind"], document);
        assert_eq!(payload["order_id"], order_id);
    }

    // Another customer sees 404 rather than 403, hiding existence
    let intruder = client();
    register_customer(&intruder).await;
    let resp = intruder
        .get(format!("{}/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order");
    assert_eq!(resp.status(), 404);
}

/// The full walkthrough: guest browsing, registration, trolley, checkout.
#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_example_shopping_scenario() {
    let staff = client();
    login_admin(&staff).await;
    let keyboard = create_product(&staff, "Scenario Keyboard", "89.90", 15).await;
    let mouse = create_product(&staff, "Scenario Mouse", "29.95", 40).await;

    // A guest starts a trolley without registering
    let shopper = client();
    let resp = shopper
        .post(format!("{}/auth/guest", base_url()))
        .send()
        .await
        .expect("Failed to create guest");
    assert_eq!(resp.status(), 201);
    assert_eq!(add_to_trolley(&shopper, keyboard, 1).await.status(), 201);
    assert_eq!(add_to_trolley(&shopper, mouse, 2).await.status(), 201);

    let trolley = get_trolley(&shopper).await;
    assert_eq!(trolley.as_array().expect("array").len(), 2);

    // Checkout needs an address
    let address_id = create_address(&shopper).await;
    let resp = place_order(&shopper, address_id).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let order_id = body["order_id"].as_i64().expect("order_id");

    let resp = shopper
        .get(format!("{}/orders/{order_id}", base_url()))
        .send()
        .await
        .expect("Failed to get order");
    let order: Value = resp.json().await.expect("order body");
    assert_eq!(order["items"].as_array().expect("items").len(), 2);
    assert_eq!(order["total"], "149.80");
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_staff_overview_lists_every_order() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Overview Test", "12.00", 10).await;

    let customer = client();
    register_customer(&customer).await;
    let address_id = create_address(&customer).await;
    assert_eq!(add_to_trolley(&customer, product_id, 1).await.status(), 201);

    let resp = place_order(&customer, address_id).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let order_id = body["order_id"].as_i64().expect("order_id");

    // Staff see everyone's orders in one listing
    let resp = staff
        .get(format!("{}/admin/orders", base_url()))
        .send()
        .await
        .expect("Failed to list orders");
    assert_eq!(resp.status(), 200);
    let orders: Value = resp.json().await.expect("orders body");
    assert!(
        orders
            .as_array()
            .expect("array")
            .iter()
            .any(|o| o["id"].as_i64() == Some(order_id))
    );

    // Customers do not
    let resp = customer
        .get(format!("{}/admin/orders", base_url()))
        .send()
        .await
        .expect("Failed to request listing");
    assert_eq!(resp.status(), 403);
}
