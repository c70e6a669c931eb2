//! Integration tests for trolley behavior.
//!
//! These tests require a running server and a migrated MariaDB database;
//! see the crate docs for the bootstrap steps.

use awe_electronics_integration_tests::{
    add_to_trolley, base_url, client, create_product, get_trolley, login_admin, register_customer,
};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_quantity_floor_rejected() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Floor Test", "10.00", 10).await;

    let customer = client();
    register_customer(&customer).await;

    for bad in [0, -1, -100] {
        let resp = add_to_trolley(&customer, product_id, bad).await;
        assert_eq!(resp.status(), 422, "quantity {bad} must be rejected");
    }
    assert!(get_trolley(&customer).await.as_array().is_some_and(Vec::is_empty));

    // And the boundary value is fine
    let resp = add_to_trolley(&customer, product_id, 1).await;
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_add_and_change_quantity() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Quantity Test", "5.50", 50).await;

    let customer = client();
    register_customer(&customer).await;

    let resp = add_to_trolley(&customer, product_id, 2).await;
    assert_eq!(resp.status(), 201);

    let resp = customer
        .patch(format!("{}/trolley", base_url()))
        .json(&json!({ "product_id": product_id, "quantity": 7 }))
        .send()
        .await
        .expect("Failed to patch trolley");
    assert_eq!(resp.status(), 204);

    let trolley = get_trolley(&customer).await;
    let line = &trolley.as_array().expect("array")[0];
    assert_eq!(line["quantity"], 7);
    // Price is not frozen until checkout
    assert!(line["price_at_sale"].is_null());
    assert_eq!(line["current_price"], "5.50");
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_change_quantity_of_absent_product_is_404() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Absent Test", "3.00", 5).await;

    let customer = client();
    register_customer(&customer).await;

    let resp = customer
        .patch(format!("{}/trolley", base_url()))
        .json(&json!({ "product_id": product_id, "quantity": 3 }))
        .send()
        .await
        .expect("Failed to patch trolley");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_remove_line_item_checks_ownership() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Ownership Test", "8.00", 10).await;

    let owner = client();
    register_customer(&owner).await;
    let resp = add_to_trolley(&owner, product_id, 1).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let line_item_id = body["line_item_id"].as_i64().expect("line_item_id");

    // A different account cannot remove it
    let intruder = client();
    register_customer(&intruder).await;
    let resp = intruder
        .delete(format!("{}/trolley/{line_item_id}", base_url()))
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(resp.status(), 404);

    // Still there for the owner, who can then remove it
    assert_eq!(get_trolley(&owner).await.as_array().expect("array").len(), 1);
    let resp = owner
        .delete(format!("{}/trolley/{line_item_id}", base_url()))
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(resp.status(), 204);
    assert!(get_trolley(&owner).await.as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_clear_is_idempotent_when_empty() {
    let customer = client();
    register_customer(&customer).await;

    for _ in 0..2 {
        let resp = customer
            .delete(format!("{}/trolley", base_url()))
            .send()
            .await
            .expect("Failed to clear trolley");
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.expect("body");
        assert_eq!(body["deleted"], 0);
    }
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB with AWE_DATABASE_URL set"]
async fn test_clear_deletes_orphaned_line_items() {
    let database_url =
        std::env::var("AWE_DATABASE_URL").expect("AWE_DATABASE_URL needed for this test");
    let pool = sqlx::MySqlPool::connect(&database_url)
        .await
        .expect("Failed to connect");

    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Orphan Test", "2.00", 30).await;

    let customer = client();
    register_customer(&customer).await;
    let resp = add_to_trolley(&customer, product_id, 3).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let line_item_id = body["line_item_id"].as_i64().expect("line_item_id");

    let resp = customer
        .delete(format!("{}/trolley", base_url()))
        .send()
        .await
        .expect("Failed to clear trolley");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["deleted"], 1);

    // The line item must not survive as an orphan
    let remaining: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM line_item WHERE id = ?")
        .bind(line_item_id)
        .fetch_optional(&pool)
        .await
        .expect("Failed to query line_item");
    assert!(remaining.is_none(), "cleared line item left behind");
}
