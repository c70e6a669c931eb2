//! Integration tests for administrative account management.

use awe_electronics_integration_tests::{
    add_to_trolley, base_url, client, create_product, login_admin, register_customer,
};
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_admin_routes_are_gated() {
    let customer = client();
    register_customer(&customer).await;

    let resp = customer
        .get(format!("{}/admin/accounts", base_url()))
        .send()
        .await
        .expect("Failed to get accounts");
    assert_eq!(resp.status(), 403);

    let anonymous = client();
    let resp = anonymous
        .get(format!("{}/admin/accounts", base_url()))
        .send()
        .await
        .expect("Failed to get accounts");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_create_employee_and_filtered_listing() {
    let admin = client();
    login_admin(&admin).await;

    let email = format!("employee_{}@test.invalid", Uuid::new_v4().simple());
    let resp = admin
        .post(format!("{}/admin/accounts", base_url()))
        .json(&json!({ "email": email, "password": "Empl0yee!pass", "role": "employee" }))
        .send()
        .await
        .expect("Failed to create employee");
    assert_eq!(resp.status(), 201);
    let account: Value = resp.json().await.expect("body");
    assert_eq!(account["role"], "employee");
    // The password hash must never appear in a response
    assert!(account.get("password_hash").is_none());

    let resp = admin
        .get(format!("{}/admin/accounts?role=employee", base_url()))
        .send()
        .await
        .expect("Failed to list");
    assert_eq!(resp.status(), 200);
    let listed: Value = resp.json().await.expect("body");
    assert!(
        listed
            .as_array()
            .expect("array")
            .iter()
            .all(|a| a["role"] == "employee")
    );
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_deactivated_account_cannot_login() {
    let admin = client();
    login_admin(&admin).await;

    let customer = client();
    let account = register_customer(&customer).await;
    let account_id = account["id"].as_i64().expect("id");
    let email = account["email"].as_str().expect("email").to_string();

    let resp = admin
        .post(format!(
            "{}/admin/accounts/{account_id}/deactivate",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to deactivate");
    assert_eq!(resp.status(), 204);

    let fresh = client();
    let resp = fresh
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({ "email": email, "password": "Cust0mer!pass" }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_bulk_delete_refuses_self() {
    let admin = client();
    login_admin(&admin).await;

    let resp = admin
        .get(format!("{}/account", base_url()))
        .send()
        .await
        .expect("Failed to get self");
    let own: Value = resp.json().await.expect("body");
    let own_id = own["id"].as_i64().expect("id");

    let resp = admin
        .delete(format!("{}/admin/accounts", base_url()))
        .json(&json!({ "account_ids": [own_id] }))
        .send()
        .await
        .expect("Failed to bulk delete");
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_bulk_delete_removes_accounts() {
    let admin = client();
    login_admin(&admin).await;

    let victim = client();
    let account = register_customer(&victim).await;
    let victim_id = account["id"].as_i64().expect("id");

    let resp = admin
        .delete(format!("{}/admin/accounts", base_url()))
        .json(&json!({ "account_ids": [victim_id] }))
        .send()
        .await
        .expect("Failed to bulk delete");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["deleted"], 1);

    let resp = admin
        .get(format!("{}/admin/accounts/{victim_id}", base_url()))
        .send()
        .await
        .expect("Failed to get account");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB with AWE_DATABASE_URL set"]
async fn test_bulk_delete_leaves_no_stranded_line_items() {
    let database_url =
        std::env::var("AWE_DATABASE_URL").expect("AWE_DATABASE_URL needed for this test");
    let pool = sqlx::MySqlPool::connect(&database_url)
        .await
        .expect("Failed to connect");

    let admin = client();
    login_admin(&admin).await;
    let product_id = create_product(&admin, "Stranded Test", "5.00", 20).await;

    let victim = client();
    let account = register_customer(&victim).await;
    let victim_id = account["id"].as_i64().expect("id");

    let resp = add_to_trolley(&victim, product_id, 2).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("body");
    let line_item_id = body["line_item_id"].as_i64().expect("line_item_id");

    let resp = admin
        .delete(format!("{}/admin/accounts", base_url()))
        .json(&json!({ "account_ids": [victim_id] }))
        .send()
        .await
        .expect("Failed to bulk delete");
    assert_eq!(resp.status(), 200);

    // Deleting the account must take its unordered trolley line with it
    let remaining: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM line_item WHERE id = ?")
        .bind(line_item_id)
        .fetch_optional(&pool)
        .await
        .expect("Failed to query line_item");
    assert!(remaining.is_none(), "deleted account left a line item behind");
}
