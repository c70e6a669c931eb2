//! Integration tests for the catalogue routes and their staff gating.

use awe_electronics_integration_tests::{
    base_url, client, create_product, login_admin, register_customer,
};
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_listing_is_public_and_searchable() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Searchable Gadget", "15.00", 5).await;

    // No session at all
    let anonymous = client();
    let resp = anonymous
        .get(format!("{}/products?search=searchable%20gadget", base_url()))
        .send()
        .await
        .expect("Failed to search");
    assert_eq!(resp.status(), 200);
    let results: Value = resp.json().await.expect("body");
    assert!(
        results
            .as_array()
            .expect("array")
            .iter()
            .any(|p| p["id"] == product_id),
        "created product not found by search"
    );
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_tag_intersection_filter() {
    let staff = client();
    login_admin(&staff).await;
    let both = create_product(&staff, "Tagged Both", "1.00", 5).await;
    let one = create_product(&staff, "Tagged One", "1.00", 5).await;

    for (product, tags) in [(both, vec!["itest-red", "itest-blue"]), (one, vec!["itest-red"])] {
        for tag in tags {
            let resp = staff
                .post(format!("{}/products/{product}/tags", base_url()))
                .json(&json!({ "name": tag }))
                .send()
                .await
                .expect("Failed to add tag");
            assert_eq!(resp.status(), 201);
        }
    }

    let resp = client()
        .get(format!(
            "{}/products?tags=itest-red,itest-blue",
            base_url()
        ))
        .send()
        .await
        .expect("Failed to filter");
    let results: Value = resp.json().await.expect("body");
    let ids: Vec<i64> = results
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert!(ids.contains(&both));
    assert!(!ids.contains(&one), "intersection must exclude partial matches");
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_repeated_tag_names_still_match() {
    let staff = client();
    login_admin(&staff).await;
    let product = create_product(&staff, "Tagged Once", "1.00", 5).await;

    let resp = staff
        .post(format!("{}/products/{product}/tags", base_url()))
        .json(&json!({ "name": "itest-dup" }))
        .send()
        .await
        .expect("Failed to add tag");
    assert_eq!(resp.status(), 201);

    // A repeated name collapses to one requirement instead of demanding
    // two distinct tags
    let resp = client()
        .get(format!("{}/products?tags=itest-dup,itest-dup", base_url()))
        .send()
        .await
        .expect("Failed to filter");
    assert_eq!(resp.status(), 200);
    let results: Value = resp.json().await.expect("body");
    let ids: Vec<i64> = results
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|p| p["id"].as_i64())
        .collect();
    assert!(ids.contains(&product));
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_catalogue_writes_require_staff() {
    let customer = client();
    register_customer(&customer).await;

    let resp = customer
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": "Forbidden Product",
            "description": "should not exist",
            "price": "1.00",
        }))
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status(), 403);

    let anonymous = client();
    let resp = anonymous
        .post(format!("{}/products", base_url()))
        .json(&json!({
            "name": "Forbidden Product",
            "description": "should not exist",
            "price": "1.00",
        }))
        .send()
        .await
        .expect("Failed to post product");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "requires a running server and MariaDB"]
async fn test_duplicate_tag_conflicts() {
    let staff = client();
    login_admin(&staff).await;
    let product_id = create_product(&staff, "Duplicate Tag Test", "2.00", 5).await;

    let add = || async {
        staff
            .post(format!("{}/products/{product_id}/tags", base_url()))
            .json(&json!({ "name": "itest-dup" }))
            .send()
            .await
            .expect("Failed to add tag")
    };

    assert_eq!(add().await.status(), 201);
    assert_eq!(add().await.status(), 409);
}
