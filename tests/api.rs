//! HTTP tests for the users / addresses API against the in-memory repository.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use user_address_api::{app, AppState};

/// Helper: one router over a shared in-memory store.
fn test_app() -> axum::Router {
    app(AppState::in_memory())
}

/// Helper: send one request and return status plus parsed JSON body.
async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_user(app: &axum::Router, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        Some(json!({ "first_name": "Asha", "last_name": "Rao", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["user"].clone()
}

async fn create_address(app: &axum::Router, user_id: i64, pincode: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/addresses",
        Some(json!({
            "user_id": user_id,
            "street": "Main",
            "city": "X",
            "state": "Y",
            "pincode": pincode
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["address"].clone()
}

// -- Operational ---------------------------------------------------------------

#[tokio::test]
async fn root_health_and_ready() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello World");

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "storage": "memory", "reachable": true }));

    let (status, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "user-address-api");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(&test_app(), "GET", "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/users/{id}"].is_object());
    assert!(body["paths"]["/api/addresses/aggregate"].is_object());
}

// -- Users ---------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_user() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "first_name": "Asha", "last_name": "Rao", "email": "asha@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully");
    let user = body["user"].clone();
    assert!(user["id"].as_i64().unwrap() > 0);
    assert!(user["created_at"].as_str().unwrap().ends_with('Z'));

    let uri = format!("/api/users/{}", user["id"]);
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], user);
}

#[tokio::test]
async fn created_ids_are_unique() {
    let app = test_app();
    let a = create_user(&app, "a@example.com").await;
    let b = create_user(&app, "b@example.com").await;
    assert_ne!(a["id"], b["id"]);
}

#[tokio::test]
async fn invalid_email_is_rejected_with_field_list() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "first_name": "Asha", "last_name": "Rao", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["errors"], json!([{ "field": "email", "message": "Invalid email" }]));

    let (_, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn missing_fields_are_all_reported() {
    let (status, body) = send(&test_app(), "POST", "/api/users", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn list_users_reports_total() {
    let app = test_app();
    create_user(&app, "a@example.com").await;
    create_user(&app, "b@example.com").await;
    let (status, body) = send(&app, "GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let (status, body) = send(&test_app(), "GET", "/api/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "User ID must be a number");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/users/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let (status, _) = send(&app, "PUT", "/api/users/404", Some(json!({ "first_name": "X" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/users/404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_only_changes_supplied_fields() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let uri = format!("/api/users/{}", user["id"]);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "last_name": "Iyer" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    let updated = &body["user"];
    assert_eq!(updated["last_name"], "Iyer");
    assert_eq!(updated["first_name"], user["first_name"]);
    assert_eq!(updated["email"], user["email"]);
    assert_eq!(updated["created_at"], user["created_at"]);
}

#[tokio::test]
async fn update_with_invalid_field_is_rejected() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let uri = format!("/api/users/{}", user["id"]);
    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "email": "nope", "first_name": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = test_app();
    create_user(&app, "same@example.com").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        Some(json!({ "first_name": "B", "last_name": "C", "email": "same@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn delete_user_then_get_is_not_found() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let uri = format!("/api/users/{}", user["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User deleted successfully", "success": true }));

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_user_removes_its_addresses() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let address = create_address(&app, user["id"].as_i64().unwrap(), "560001").await;

    send(&app, "DELETE", &format!("/api/users/{}", user["id"]), None).await;
    let (status, _) = send(&app, "GET", &format!("/api/addresses/{}", address["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn aggregate_nests_addresses_under_owner() {
    let app = test_app();
    let a = create_user(&app, "a@example.com").await;
    let b = create_user(&app, "b@example.com").await;
    let a_id = a["id"].as_i64().unwrap();
    let first = create_address(&app, a_id, "560001").await;
    let second = create_address(&app, a_id, "560002").await;

    let (status, body) = send(&app, "GET", "/api/users/aggregate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);

    let owner = data.iter().find(|u| u["id"] == a["id"]).unwrap();
    assert_eq!(owner["addresses"], json!([first, second]));
    let empty = data.iter().find(|u| u["id"] == b["id"]).unwrap();
    assert_eq!(empty["addresses"], json!([]));
}

// -- Addresses -----------------------------------------------------------------

#[tokio::test]
async fn create_address_then_filter_by_other_pincode() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/addresses",
        Some(json!({ "user_id": user["id"], "street": "Main", "city": "X", "state": "Y", "pincode": "560001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Address created successfully");
    assert_eq!(body["address"]["pincode"], "560001");

    let (status, body) = send(&app, "GET", "/api/addresses?pincode=560002", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No addresses found for this pincode");

    let (status, body) = send(&app, "GET", "/api/addresses?pincode=560001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addresses"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn address_for_missing_user_conflicts() {
    let (status, body) = send(
        &test_app(),
        "POST",
        "/api/addresses",
        Some(json!({ "user_id": 42, "street": "Main", "city": "X", "state": "Y", "pincode": "560001" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn invalid_address_fields_are_all_reported() {
    let (status, body) = send(
        &test_app(),
        "POST",
        "/api/addresses",
        Some(json!({ "user_id": 0, "street": "", "city": "X", "pincode": "12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["user_id", "street", "state", "pincode"]);
}

#[tokio::test]
async fn aggregate_pincode_semantics() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/addresses/aggregate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "addresses": [] }));

    let (status, _) = send(&app, "GET", "/api/addresses/aggregate?pincode=560001", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let user = create_user(&app, "asha@example.com").await;
    create_address(&app, user["id"].as_i64().unwrap(), "560001").await;
    create_address(&app, user["id"].as_i64().unwrap(), "110001").await;

    let (status, body) = send(&app, "GET", "/api/addresses/aggregate?pincode=560001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addresses"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/addresses/aggregate", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addresses"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_pincode_filter_is_bad_request() {
    let (status, body) = send(&test_app(), "GET", "/api/addresses?pincode=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Invalid pincode");
}

#[tokio::test]
async fn address_listing_pages() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let user_id = user["id"].as_i64().unwrap();
    for _ in 0..5 {
        create_address(&app, user_id, "560001").await;
    }
    let (status, body) = send(&app, "GET", "/api/addresses?page=2&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["addresses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 4]);

    let (status, body) = send(&app, "GET", "/api/addresses?pincode=560001&page=5&limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["addresses"], json!([]));

    let (status, _) = send(&app, "GET", "/api/addresses?pincode=110001&page=1&limit=10", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, "GET", "/api/addresses?page=x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["message"], "Page must be a number");
}

#[tokio::test]
async fn address_partial_update_and_delete() {
    let app = test_app();
    let user = create_user(&app, "asha@example.com").await;
    let address = create_address(&app, user["id"].as_i64().unwrap(), "560001").await;
    let uri = format!("/api/addresses/{}", address["id"]);

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "city": "Pune" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Address updated successfully");
    assert_eq!(body["address"]["city"], "Pune");
    assert_eq!(body["address"]["street"], address["street"]);
    assert_eq!(body["address"]["pincode"], address["pincode"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Address deleted successfully", "success": true }));

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Address not found");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
