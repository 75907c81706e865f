//! CRUD endpoints and error responses through full HTTP round trips

mod common;

use axum::http::StatusCode;
use catalog::core::{FetchRequest, Predicate, RecordStore};
use common::create_test_app;
use serde_json::{Value, json};

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = create_test_app();

    for path in ["/health", "/healthz"] {
        let response = app.server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ok");
    }
}

// =============================================================================
// Category Tests
// =============================================================================

#[tokio::test]
async fn test_store_category() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/categories")
        .json(&json!({"name": "Nike Shoes", "parent_id": null}))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["message"], "The new category has been saved.");
    assert_eq!(body["data"]["name"], "Nike Shoes");
    assert!(body["data"]["parent_id"].is_null());
    assert!(body["data"]["id"].as_i64().is_some());
    assert!(body["data"]["created_at"].as_str().is_some());
}

#[tokio::test]
async fn test_store_category_requires_name() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/categories")
        .json(&json!({"name": "", "parent_id": "asda"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["message"], "The given data was invalid.");
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
    assert_eq!(
        body["errors"]["parent_id"][0],
        "The parent id must be an integer."
    );
}

#[tokio::test]
async fn test_show_category() {
    let app = create_test_app();
    let id = app.category("Shoes", None).await;

    let response = app.server.get(&format!("/api/categories/{id}")).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "success");
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["name"], "Shoes");
}

#[tokio::test]
async fn test_show_missing_category_is_404() {
    let app = create_test_app();

    app.server
        .get("/api/categories/99")
        .await
        .assert_status_not_found();
    app.server
        .get("/api/categories/not-a-number")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_category_ignores_extra_fields() {
    let app = create_test_app();
    let id = app.category("Shoes", None).await;

    let response = app
        .server
        .put(&format!("/api/categories/{id}"))
        .json(&json!({"name": "Puma Shoes", "description": "Puma Description"}))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["message"], "The category has been updated.");
    assert_eq!(body["data"]["name"], "Puma Shoes");
    assert!(body["data"].get("description").is_none());
}

#[tokio::test]
async fn test_update_missing_category_is_404() {
    let app = create_test_app();

    app.server
        .put("/api/categories/5")
        .json(&json!({"name": "Anything"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_delete_category_removes_its_products() {
    let app = create_test_app();
    let shoes = app.category("Shoes", None).await;
    let bags = app.category("Bags", None).await;
    app.product("Nike Shoes", "Running", 2, shoes).await;
    app.product("Adidas Shoes", "Comfortable", 5, shoes).await;
    let bag = app.product("Leather Bag", "Brown", 1, bags).await;

    let response = app.server.delete(&format!("/api/categories/{shoes}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "The category has been deleted.");

    app.server
        .get(&format!("/api/categories/{shoes}"))
        .await
        .assert_status_not_found();

    let remaining = app
        .store
        .fetch("products", &FetchRequest::matching(Predicate::All, Vec::new()))
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].key("id"), Some(bag));
}

#[tokio::test]
async fn test_delete_missing_category_is_404() {
    let app = create_test_app();

    app.server
        .delete("/api/categories/1")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_invalid_parent_filter_is_422() {
    let app = create_test_app();
    app.categories(4).await;

    let response = app
        .server
        .get("/api/categories")
        .add_query_param("filter[parent_id]", "asalaja")
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "The given data was invalid.");
    assert_eq!(
        body["errors"]["filter.parent_id"][0],
        "The filter.parent_id must be an integer."
    );
}

// =============================================================================
// Product Tests
// =============================================================================

#[tokio::test]
async fn test_store_product() {
    let app = create_test_app();
    let shoes = app.category("Shoes", None).await;

    let response = app
        .server
        .post("/api/products")
        .json(&json!({
            "name": "Nike Shoes",
            "description": "Running",
            "stock": 2,
            "category_id": shoes
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["message"], "The new product has been saved.");
    assert_eq!(body["data"]["name"], "Nike Shoes");
    assert_eq!(body["data"]["stock"], 2);
    assert_eq!(body["data"]["category_id"], shoes);
}

#[tokio::test]
async fn test_store_product_validation() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/products")
        .json(&json!({"name": "", "description": "", "stock": "", "category_id": ""}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    let errors = body["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 3);
    assert!(!errors.contains_key("description"));
    assert_eq!(errors["name"][0], "The name field is required.");
    assert_eq!(errors["stock"][0], "The stock field is required.");
    assert_eq!(errors["category_id"][0], "The category id field is required.");
}

#[tokio::test]
async fn test_store_product_rejects_malformed_json() {
    let app = create_test_app();

    let response = app
        .server
        .post("/api/products")
        .bytes(axum::body::Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let app = create_test_app();
    let shoes = app.category("Shoes", None).await;
    let id = app.product("Nike Shoes", "Running", 2, shoes).await;

    let response = app
        .server
        .put(&format!("/api/products/{id}"))
        .json(&json!({
            "name": "Nike Air",
            "description": null,
            "stock": "7",
            "category_id": shoes
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "The product has been updated.");
    assert_eq!(body["data"]["name"], "Nike Air");
    assert_eq!(body["data"]["stock"], 7);
    assert!(body["data"]["description"].is_null());

    let response = app.server.delete(&format!("/api/products/{id}")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "The product has been deleted.");
    assert_eq!(body["data"]["id"], id);

    app.server
        .get(&format!("/api/products/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_unknown_resource_is_404() {
    let app = create_test_app();

    let response = app.server.get("/api/orders").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["code"], "UNKNOWN_RESOURCE_TYPE");
}
