//! Request pipeline integration tests
//!
//! Exercises `server::dispatch` without a socket: token checks, revocation,
//! the route permission gate, envelopes and the request timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::header::{HeaderValue, AUTHORIZATION};
use hyper::{HeaderMap, Method, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use laurel::auth::{Claims, JwtValidator, Role, TokenInput};
use laurel::config::Args;
use laurel::db::SqliteStatusStore;
use laurel::directory::{Directory, StaticDirectory};
use laurel::server::{dispatch, AppState};
use laurel::store::MemoryContentStore;
use laurel::types::Result;
use laurel::AchievementService;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

// =============================================================================
// Harness
// =============================================================================

fn args(timeout_ms: u64) -> Args {
    let mut args = Args::try_parse_from(["laurel"]).unwrap();
    args.jwt_secret = Some(SECRET.to_string());
    args.request_timeout_ms = timeout_ms;
    args
}

fn directory() -> Arc<StaticDirectory> {
    let directory = Arc::new(StaticDirectory::with_default_grants());
    directory.add_student("u-dina", "S-1", Some("L-1"));
    directory.add_advisor("u-lecturer-1", "L-1");
    directory
}

fn state_with(directory: Arc<dyn Directory>, timeout_ms: u64) -> AppState {
    let service = AchievementService::new(
        Arc::new(MemoryContentStore::new()),
        Arc::new(SqliteStatusStore::open_in_memory().unwrap()),
        directory.clone(),
    );
    let jwt = JwtValidator::new(SECRET.to_string(), 3600).unwrap();
    AppState::new(args(timeout_ms), service, jwt, directory, "memory")
}

fn token(state: &AppState, user_id: &str, role: Role) -> String {
    state
        .jwt
        .generate_token(TokenInput {
            user_id: user_id.into(),
            username: user_id.into(),
            role,
        })
        .unwrap()
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    headers
}

async fn call(
    state: &AppState,
    method: Method,
    path: &str,
    headers: &HeaderMap,
    body: Value,
) -> (StatusCode, Value) {
    let body = if body.is_null() {
        Bytes::new()
    } else {
        Bytes::from(body.to_string())
    };
    let response = dispatch(state, &method, path, headers, body).await;
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn create_body() -> Value {
    json!({
        "achievement_type": "competition",
        "title": "Robotics cup",
        "points": 30,
        "details": { "level": "national" }
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let state = state_with(directory(), 5_000);
    let (status, body) = call(
        &state,
        Method::GET,
        "/api/v1/achievements",
        &HeaderMap::new(),
        Value::Null,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
    assert_eq!(body["message"], "Unauthorized");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_role_is_forbidden() {
    let state = state_with(directory(), 5_000);
    let claims = Claims {
        user_id: "u-dean".into(),
        username: "dean".into(),
        role: "Dean".into(),
        iat: 0,
        exp: 4_000_000_000,
    };
    let forged = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/v1/achievements",
        &bearer(&forged),
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "access denied");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let state = state_with(directory(), 5_000);
    let headers = bearer(&token(&state, "u-dina", Role::Student));

    let (status, _) = call(&state, Method::GET, "/api/v1/achievements", &headers, Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&state, Method::POST, "/api/v1/auth/logout", &headers, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, _) = call(&state, Method::GET, "/api/v1/achievements", &headers, Value::Null).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Route gate
// =============================================================================

#[tokio::test]
async fn test_route_gate_uses_current_grants() {
    let dir = directory();
    let state = state_with(dir.clone(), 5_000);
    let student = bearer(&token(&state, "u-dina", Role::Student));
    let advisor = bearer(&token(&state, "u-lecturer-1", Role::Advisor));

    // Advisors are never granted achievement:create
    let (status, _) = call(&state, Method::POST, "/api/v1/achievements", &advisor, create_body()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&state, Method::POST, "/api/v1/achievements", &student, create_body()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Achievement created");
    assert_eq!(body["data"]["achievement"]["student_id"], "S-1");
    assert_eq!(body["data"]["status"]["status"], "draft");

    // Grants are read on every request
    dir.grant(Role::Student, &["achievement:read"]);
    let (status, _) = call(&state, Method::POST, "/api/v1/achievements", &student, create_body()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Lifecycle over HTTP
// =============================================================================

#[tokio::test]
async fn test_submit_verify_and_error_mapping() {
    let state = state_with(directory(), 5_000);
    let student = bearer(&token(&state, "u-dina", Role::Student));
    let advisor = bearer(&token(&state, "u-lecturer-1", Role::Advisor));

    let (_, created) = call(&state, Method::POST, "/api/v1/achievements", &student, create_body()).await;
    let id = created["data"]["achievement"]["id"].as_str().unwrap().to_string();
    let item = format!("/api/v1/achievements/{}", id);

    let (status, body) = call(&state, Method::POST, &format!("{}/verify", item), &advisor, Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot verify an achievement that is draft");

    let (status, _) = call(&state, Method::POST, &format!("{}/submit", item), &student, Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&state, Method::PUT, &item, &student, json!({ "title": "late edit" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, body) = call(
        &state,
        Method::POST,
        &format!("{}/reject", item),
        &advisor,
        json!({ "rejection_note": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "rejection note is required");

    let (status, body) = call(&state, Method::POST, &format!("{}/verify", item), &advisor, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"]["status"], "verified");

    let (status, body) = call(&state, Method::GET, &format!("{}/history", item), &student, Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 3);

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/v1/achievements/65f000000000000000000000",
        &student,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}

#[tokio::test]
async fn test_list_filtered_by_status_query() {
    let state = state_with(directory(), 5_000);
    let student = bearer(&token(&state, "u-dina", Role::Student));
    let advisor = bearer(&token(&state, "u-lecturer-1", Role::Advisor));

    let (_, draft) = call(&state, Method::POST, "/api/v1/achievements", &student, create_body()).await;
    let (_, submitted) = call(&state, Method::POST, "/api/v1/achievements", &student, create_body()).await;
    let submitted_id = submitted["data"]["achievement"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/achievements/{}/submit", submitted_id);
    let (status, _) = call(&state, Method::POST, &path, &student, Value::Null).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/v1/achievements?status=submitted",
        &advisor,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["achievement"]["id"], submitted_id.as_str());

    let (_, body) = call(&state, Method::GET, "/api/v1/achievements?status=draft", &student, Value::Null).await;
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["achievement"]["id"], draft["data"]["achievement"]["id"]);

    let (_, body) = call(&state, Method::GET, "/api/v1/achievements", &student, Value::Null).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = call(
        &state,
        Method::GET,
        "/api/v1/achievements?status=archived",
        &student,
        Value::Null,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let state = state_with(directory(), 5_000);
    let student = bearer(&token(&state, "u-dina", Role::Student));

    let response = dispatch(
        &state,
        &Method::POST,
        "/api/v1/achievements",
        &student,
        Bytes::from_static(b"{not json"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Timeout
// =============================================================================

/// Directory whose permission lookup never answers in time
struct StalledDirectory;

#[async_trait]
impl Directory for StalledDirectory {
    async fn resolve_student_id(&self, _: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn resolve_advisor_id(&self, _: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn list_advisee_student_ids(&self, _: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn current_role_permissions(&self, _: &str) -> Result<Vec<String>> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_slow_request_times_out() {
    let state = state_with(Arc::new(StalledDirectory), 50);
    let student = bearer(&token(&state, "u-dina", Role::Student));

    let (status, body) = call(&state, Method::GET, "/api/v1/achievements", &student, Value::Null).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], 504);
}

// =============================================================================
// Misc routes
// =============================================================================

#[tokio::test]
async fn test_health_and_unknown_route() {
    let state = state_with(directory(), 5_000);

    let (status, body) = call(&state, Method::GET, "/health", &HeaderMap::new(), Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["content_store"], "memory");

    let (status, _) = call(&state, Method::GET, "/api/v2/nothing", &HeaderMap::new(), Value::Null).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
