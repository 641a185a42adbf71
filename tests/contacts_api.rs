//! Router-level tests over the in-memory store.

mod common;

use axum::http::{header::LOCATION, Method, StatusCode};
use common::{
    body_json, build_test_app, build_test_app_with, build_test_app_with_config, contact_body, known_users, ALICE, BOB,
};
use contacts_api::config::AppConfig;
use contacts_api::testing::StaticTokenValidator;
use serde_json::json;

// ---------------------------------------------------------------------------
// Public routes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_database_state() {
    let app = build_test_app();

    let response = app.get("/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["database"], "ok");

    app.store.set_offline(true);
    let response = app.get("/api/health", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn api_index_lists_endpoints() {
    let app = build_test_app();
    let response = app.get("/api", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Contacts API");
    assert!(json["data"]["endpoints"]["POST /api/contacts"].is_string());
}

#[tokio::test]
async fn unknown_paths_redirect_or_404() {
    let app = build_test_app();

    let response = app.get("/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[LOCATION], "/");

    let response = app.get("/api/unknown", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Authentication gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn contacts_require_bearer_token() {
    let app = build_test_app();

    let response = app.get("/api/contacts", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = app.get("/api/contacts", Some("not-a-known-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid access token");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn auth_service_outage_is_bad_gateway() {
    let app = build_test_app_with(StaticTokenValidator::unavailable());
    let response = app.get("/api/contacts", Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "BAD_GATEWAY");
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_camel_case_contact() {
    let app = build_test_app();
    let mut body = contact_body("Ada", "Lovelace", "ada@example.com");
    body["company"] = json!({ "name": "Analytical Engines", "title": "Programmer" });
    body["tags"] = json!(["math", "history"]);

    let created = app.create(ALICE, body).await;

    assert!(created["id"].as_str().unwrap().starts_with('c'));
    assert_eq!(created["firstName"], "Ada");
    assert_eq!(created["email"]["primary"], "ada@example.com");
    assert_eq!(created["company"]["name"], "Analytical Engines");
    assert_eq!(created["tags"], json!(["math", "history"]));
    assert_eq!(created["projectIds"], json!([]));
    assert!(created["createdAt"].is_string());
    assert!(created.get("createdBy").is_none());
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn get_patch_delete_roundtrip() {
    let app = build_test_app();
    let created = app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let response = app.get(&uri, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["lastName"], "Lovelace");

    let response = app
        .send(Method::PATCH, &uri, Some(ALICE), Some(json!({ "lastName": "King", "tags": ["vip"] })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patched = body_json(response).await["data"].clone();
    assert_eq!(patched["lastName"], "King");
    assert_eq!(patched["firstName"], "Ada");
    assert_eq!(patched["tags"], json!(["vip"]));

    let response = app.send(Method::DELETE, &uri, Some(ALICE), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], created["id"]);

    let response = app.get(&uri, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Contact not found");
}

#[tokio::test]
async fn patch_null_clears_optional_fields() {
    let app = build_test_app();
    let mut body = contact_body("Ada", "Lovelace", "ada@example.com");
    body["company"] = json!({ "name": "Analytical Engines" });
    let created = app.create(ALICE, body).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let response = app.send(Method::PATCH, &uri, Some(ALICE), Some(json!({ "company": null }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["company"].is_null());
}

#[tokio::test]
async fn other_users_contacts_are_forbidden() {
    let app = build_test_app();
    let created = app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let response = app.get(&uri, Some(BOB)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(Method::PATCH, &uri, Some(BOB), Some(json!({ "lastName": "Byron" }))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(Method::DELETE, &uri, Some(BOB), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.store.len().await, 1);

    let response = app.get("/api/contacts", Some(BOB)).await;
    assert_eq!(body_json(response).await["data"]["pagination"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Validation and conflicts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_fields_are_reported_per_path() {
    let app = build_test_app();
    let body = json!({
        "firstName": "A",
        "lastName": "Lovelace",
        "email": { "primary": "not-an-email" },
        "phones": [{ "type": "work", "number": "555-1234", "primary": true }]
    });

    let response = app.send(Method::POST, "/api/contacts", Some(ALICE), Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Validation error");
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["details"]["firstName"].is_array());
    assert!(json["details"]["email.primary"].is_array());
    assert!(json["details"]["phones[0].number"].is_array());
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn exactly_one_primary_phone() {
    let app = build_test_app();
    let mut body = contact_body("Ada", "Lovelace", "ada@example.com");
    body["phones"] = json!([
        { "type": "work", "number": "+1-555-123-4567", "primary": false },
        { "type": "home", "number": "+1-555-765-4321", "primary": false }
    ]);

    let response = app.send(Method::POST, "/api/contacts", Some(ALICE), Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Exactly one phone number must be marked as primary"
    );
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = build_test_app();
    let response = app.send_raw(Method::POST, "/api/contacts", ALICE, "{\"firstName\": ").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_JSON");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = AppConfig::development();
    config.api.max_request_size_bytes = 64;
    let app = build_test_app_with_config(known_users(), config);

    let response = app
        .send(Method::POST, "/api/contacts", Some(ALICE), Some(contact_body("Ada", "Lovelace", "ada@example.com")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "Request body exceeds the maximum allowed size");
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn empty_patch_is_rejected() {
    let app = build_test_app();
    let created = app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let response = app.send(Method::PATCH, &uri, Some(ALICE), Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No valid fields to update");
}

#[tokio::test]
async fn duplicate_email_conflicts_with_existing_id() {
    let app = build_test_app();
    let first = app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;

    let response = app
        .send(
            Method::POST,
            "/api/contacts",
            Some(ALICE),
            Some(contact_body("Augusta", "King", "ada@example.com")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["details"]["contactId"], first["id"]);

    // Another owner may reuse the address
    app.create(BOB, contact_body("Ada", "Lovelace", "ada@example.com")).await;

    // Patching a second contact onto the taken address conflicts too
    let second = app.create(ALICE, contact_body("Charles", "Babbage", "charles@example.com")).await;
    let uri = format!("/api/contacts/{}", second["id"].as_str().unwrap());
    let response = app
        .send(Method::PATCH, &uri, Some(ALICE), Some(json!({ "email": { "primary": "ada@example.com" } })))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_paginates_filters_and_sorts() {
    let app = build_test_app();
    for (first, email, company) in [
        ("Alice", "alice@example.com", "Acme"),
        ("Bob", "bob@example.com", "Globex"),
        ("Carol", "carol@example.com", "Acme Labs"),
    ] {
        let mut body = contact_body(first, "Tester", email);
        body["company"] = json!({ "name": company });
        app.create(ALICE, body).await;
    }

    let response = app
        .get("/api/contacts?sortBy=firstName&sortOrder=asc&pageSize=2&page=1", Some(ALICE))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<&str> = json["data"]["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["firstName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob"]);
    assert_eq!(
        json["data"]["pagination"],
        json!({ "page": 1, "pageSize": 2, "total": 3, "totalPages": 2 })
    );

    let response = app.get("/api/contacts?company=acme", Some(ALICE)).await;
    assert_eq!(body_json(response).await["data"]["pagination"]["total"], 2);
}

#[tokio::test]
async fn list_rejects_bad_parameters() {
    let app = build_test_app();
    for query in ["page=0", "page=abc", "sortBy=password", "sortOrder=sideways"] {
        let response = app.get(&format!("/api/contacts?{}", query), Some(ALICE)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", query);
    }
}

#[tokio::test]
async fn list_caps_page_size() {
    let app = build_test_app();
    let response = app.get("/api/contacts?pageSize=1000", Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["pagination"]["pageSize"], 100);
}

#[tokio::test]
async fn list_survives_zero_page_size_config() {
    let mut config = AppConfig::development();
    config.api.max_page_size = 0;
    let app = build_test_app_with_config(known_users(), config);
    app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;

    let response = app.get("/api/contacts", Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let pagination = body_json(response).await["data"]["pagination"].clone();
    assert_eq!(pagination["pageSize"], 1);
    assert_eq!(pagination["total"], 1);
    assert_eq!(pagination["totalPages"], 1);
}

// ---------------------------------------------------------------------------
// Email lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_by_email_reports_existence() {
    let app = build_test_app();
    let created = app.create(ALICE, contact_body("Ada", "Lovelace", "ada@example.com")).await;

    let response = app
        .get("/api/contacts/find-by-email?email=ada%40example.com", Some(ALICE))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["exists"], true);
    assert_eq!(json["data"]["contactId"], created["id"]);

    let response = app
        .get("/api/contacts/find-by-email?email=ada%40example.com", Some(BOB))
        .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["exists"], false);
    assert!(json["data"]["contactId"].is_null());
}

#[tokio::test]
async fn find_by_email_validates_parameter() {
    let app = build_test_app();

    let response = app.get("/api/contacts/find-by-email", Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Email parameter is required");

    let response = app.get("/api/contacts/find-by-email?email=nope", Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid email format");
}

#[tokio::test]
async fn find_by_email_limits_characters_not_bytes() {
    let app = build_test_app();
    // 84 characters, 104 bytes
    let email = format!("{}@{}.de", "a".repeat(60), "%C3%A4".repeat(20));

    let response = app
        .get(&format!("/api/contacts/find-by-email?email={}", email), Some(ALICE))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["exists"], false);
}
