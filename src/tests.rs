// HTTP tests for the portal API
// Exercise the full router over a seeded in-memory store

use super::*;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use crate::auth::PasswordConfig;
use crate::memory::InMemoryStore;
use crate::roles::RoleCode;
use crate::seed::{seed, DEMO_PASSWORD};

// ============================================================================
// Test Helpers
// ============================================================================

const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

fn cheap_passwords() -> PasswordService {
    PasswordService::new(PasswordConfig {
        memory_kib: 256,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

/// Router over a freshly seeded in-memory store
async fn create_test_app() -> TestServer {
    let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
    let passwords = cheap_passwords();
    seed(&repos, &passwords).await.unwrap();

    let state = AppState::new(&repos, passwords, Arc::new(TokenService::new(TEST_SECRET)));
    TestServer::new(create_router(state, cors_layer(None).unwrap())).unwrap()
}

/// Router over an empty store: no roles, no menus
async fn create_unseeded_app() -> TestServer {
    let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
    let state = AppState::new(&repos, cheap_passwords(), Arc::new(TokenService::new(TEST_SECRET)));
    TestServer::new(create_router(state, cors_layer(None).unwrap())).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

fn registration_payload(username: &str, email: &str) -> Value {
    json!({
        "uin": "9501015678",
        "nameCyrillic": "Алиса Тестова",
        "nameLatin": "Alice Testova",
        "email": email,
        "phoneNumber": "+359 88 222 3344",
        "address": "ул. Шишман 12, София, 1000",
        "username": username,
        "password": "Secret123"
    })
}

async fn login_token(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": username, "password": DEMO_PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()["token"].as_str().unwrap().to_string()
}

fn menu_keys(nodes: &Value) -> Vec<String> {
    nodes
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["key"].as_str().unwrap().to_string())
        .collect()
}

fn find_node<'a>(nodes: &'a Value, key: &str) -> Option<&'a Value> {
    nodes.as_array()?.iter().find(|node| node["key"] == key)
}

// ============================================================================
// Registration and login
// ============================================================================

#[tokio::test]
async fn test_register_then_fetch_current_user() {
    let server = create_test_app().await;

    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["username"], "alice");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    let token = body["token"].as_str().unwrap();

    let me = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(token))
        .await;
    me.assert_status_ok();

    let me_body: Value = me.json();
    assert_eq!(me_body["success"], true);
    assert_eq!(me_body["user"], body["user"]);
    assert!(me_body["user"].get("password").is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let server = create_test_app().await;
    server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("alicia", "Alice@Example.com"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "success": false,
        "message": "User with this email already exists"
    }));
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let server = create_test_app().await;
    server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "someone.else@example.com"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Username already taken");
}

#[tokio::test]
async fn test_seeded_username_conflicts() {
    let server = create_test_app().await;
    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("testuser", "fresh@example.com"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["message"], "Username already taken");
}

#[tokio::test]
async fn test_invalid_registration_reports_field_errors() {
    let server = create_test_app().await;
    let mut payload = registration_payload("alice", "not-an-email");
    payload["uin"] = json!("12");

    let response = server.post("/api/auth/register").json(&payload).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request validation failed");
    assert!(body["details"].get("email").is_some());
    assert!(body["details"].get("uin").is_some());
}

#[tokio::test]
async fn test_login_body_missing_field_is_rejected() {
    let server = create_test_app().await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "testuser" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Request validation failed");
    assert!(body["details"]["body"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_non_json_bodies_are_rejected() {
    let server = create_test_app().await;

    let plain = server
        .post("/api/auth/login")
        .text("username=testuser&password=Test123!")
        .await;
    plain.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(plain.json::<Value>()["message"], "Request validation failed");

    let truncated = server
        .post("/api/auth/register")
        .text(r#"{"username": "alice""#)
        .content_type("application/json")
        .await;
    truncated.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(truncated.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_registration_without_default_role_is_a_server_fault() {
    let server = create_unseeded_app().await;
    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_server_fault_detail_shown_outside_production() {
    let repos = Repositories::in_memory(Arc::new(InMemoryStore::new()));
    let state = AppState::new(&repos, cheap_passwords(), Arc::new(TokenService::new(TEST_SECRET)))
        .with_error_details(true);
    let server = TestServer::new(create_router(state, cors_layer(None).unwrap())).unwrap();

    let response = server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert_eq!(body["message"], "Internal server error");
    assert!(body["error"].as_str().unwrap().contains("default role 'user'"));
}

#[tokio::test]
async fn test_login_returns_same_projection_as_registration() {
    let server = create_test_app().await;
    let registered: Value = server
        .post("/api/auth/register")
        .json(&registration_payload("alice", "alice@example.com"))
        .await
        .json();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "username": "alice", "password": "Secret123" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"], registered["user"]);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_repeated_wrong_password_gets_same_401() {
    let server = create_test_app().await;

    for _ in 0..3 {
        let response = server
            .post("/api/auth/login")
            .json(&json!({ "username": "testuser", "password": "WrongPass1" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "success": false, "message": "Invalid credentials" }));
    }

    let unknown = server
        .post("/api/auth/login")
        .json(&json!({ "username": "nonexistent", "password": "anything" }))
        .await;
    unknown.assert_status(StatusCode::UNAUTHORIZED);
    unknown.assert_json(&json!({ "success": false, "message": "Invalid credentials" }));

    // No lockout after the failures
    login_token(&server, "testuser").await;
}

// ============================================================================
// Auth gate
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = create_test_app().await;

    for path in ["/api/users/me", "/api/menus", "/api/roles"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "success": false, "message": "Authentication required" }));
    }
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let server = create_test_app().await;
    let foreign = TokenService::new("another_secret").issue(1, RoleCode::Admin).unwrap();

    for token in ["garbage", foreign.as_str()] {
        let response = server
            .get("/api/menus")
            .add_header(AUTHORIZATION, bearer(token))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        response.assert_json(&json!({ "success": false, "message": "Invalid or expired token" }));
    }
}

#[tokio::test]
async fn test_empty_bearer_token_counts_as_missing() {
    let server = create_test_app().await;

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, HeaderValue::from_static("Bearer "))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    response.assert_json(&json!({ "success": false, "message": "Authentication required" }));
}

#[tokio::test]
async fn test_token_for_vanished_user_is_not_found() {
    let server = create_test_app().await;
    let token = TokenService::new(TEST_SECRET).issue(9999, RoleCode::User).unwrap();

    let response = server
        .get("/api/users/me")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["message"], "User not found");
}

#[tokio::test]
async fn test_roles_are_admin_only() {
    let server = create_test_app().await;

    for username in ["testuser", "testcompany"] {
        let token = login_token(&server, username).await;
        let response = server
            .get("/api/roles")
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        response.assert_json(&json!({ "success": false, "message": "Insufficient permissions" }));
    }

    let token = login_token(&server, "testadmin").await;
    let response = server
        .get("/api/roles")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let codes: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|role| role["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["user", "admin", "company"]);
}

// ============================================================================
// Menus
// ============================================================================

#[tokio::test]
async fn test_user_menu_tree() {
    let server = create_test_app().await;
    let token = login_token(&server, "testuser").await;

    let response = server
        .get("/api/menus")
        .add_header(AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(
        menu_keys(&body["data"]),
        vec!["home", "payments", "statements", "accounts", "deposits", "cards"]
    );

    let payments = find_node(&body["data"], "payments").unwrap();
    assert_eq!(menu_keys(&payments["children"]), vec!["domesticPayment"]);
    assert_eq!(payments["icon"], "Payment");
    assert_eq!(payments["href"], "/dashboard/payments");
}

#[tokio::test]
async fn test_company_menu_tree() {
    let server = create_test_app().await;
    let token = login_token(&server, "testcompany").await;

    let body: Value = server
        .get("/api/menus")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();

    assert_eq!(
        menu_keys(&body["data"]),
        vec!["home", "payments", "statements", "accounts", "signTransfers", "documents", "services"]
    );
    let payments = find_node(&body["data"], "payments").unwrap();
    assert_eq!(
        menu_keys(&payments["children"]),
        vec!["domesticPayment", "internationalPayment"]
    );
    assert_eq!(payments["children"][1]["icon"], "Globe");
}

#[tokio::test]
async fn test_admin_sees_every_menu() {
    let server = create_test_app().await;
    let token = login_token(&server, "testadmin").await;

    let body: Value = server
        .get("/api/menus")
        .add_header(AUTHORIZATION, bearer(&token))
        .await
        .json();

    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 12);
    let orders: Vec<i64> = roots.iter().map(|node| node["order"].as_i64().unwrap()).collect();
    assert_eq!(orders, (1..=12).collect::<Vec<i64>>());
}

// ============================================================================
// Misc routes
// ============================================================================

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = create_test_app().await;

    for path in ["/api/nothing-here", "/nowhere"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&json!({ "success": false, "message": "Route not found" }));
    }
}

#[tokio::test]
async fn test_banner_and_openapi() {
    let server = create_test_app().await;

    let banner = server.get("/").await;
    banner.assert_status_ok();
    banner.assert_text("Portal API is running");

    let spec: Value = server.get("/api-docs/openapi.json").await.json();
    assert!(spec["paths"].get("/api/menus").is_some());
    assert!(spec["components"]["securitySchemes"].get("bearer_auth").is_some());
}
