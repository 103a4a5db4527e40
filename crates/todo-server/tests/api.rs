//! Router-level tests: requests go through the full middleware stack via
//! `oneshot`, backed by the in-memory store.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use todo_auth::{AuthError, AuthService, IdentityProvider, ProviderProfile, SessionManager};
use todo_core::{MemoryStore, ServerConfig, TodoService};
use todo_server::{AppState, create_router};
use tower::ServiceExt;
use url::Url;

const SECRET: &[u8] = b"api-test-secret";

struct FakeGoogle;

#[async_trait]
impl IdentityProvider for FakeGoogle {
    fn authorize_url(&self, state: &str) -> Url {
        let mut url = Url::parse("https://accounts.example.test/o/oauth2/auth").unwrap();
        url.query_pairs_mut()
            .append_pair("client_id", "test-client")
            .append_pair("state", state);
        url
    }

    async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        match code {
            "good-code" => Ok("access-token".to_string()),
            "down" => Err(AuthError::ProviderUnavailable("token endpoint returned 503".to_string())),
            _ => Err(AuthError::InvalidGrant("Bad Request".to_string())),
        }
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<ProviderProfile, AuthError> {
        Ok(ProviderProfile {
            sub: "google-42".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
        })
    }
}

fn open_app() -> Router {
    let store = MemoryStore::new();
    let state = AppState::new(TodoService::new(Arc::new(store)), None);
    create_router(state, &ServerConfig::default())
}

/// Router in google mode plus the manager that signs its sessions.
fn google_app() -> (Router, SessionManager) {
    let store = MemoryStore::new();
    let sessions = SessionManager::new(SECRET, Duration::hours(1));
    let auth = AuthService::new(
        Arc::new(FakeGoogle),
        Arc::new(store.clone()),
        sessions.clone(),
        "http://localhost:3000",
    )
    .unwrap();
    let state = AppState::new(TodoService::new(Arc::new(store)), Some(auth));
    (create_router(state, &ServerConfig::default()), sessions)
}

fn bearer(sessions: &SessionManager, user: &str) -> String {
    let (token, _) = sessions.issue(user).unwrap();
    format!("Bearer {token}")
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, value)
}

fn location(headers: &axum::http::HeaderMap) -> Url {
    let raw = headers.get(header::LOCATION).unwrap().to_str().unwrap();
    Url::parse(raw).unwrap()
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn test_root_and_healthz() {
    let app = open_app();

    let (status, _, body) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Todo API is running" }));

    let (status, _, body) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_todo_lifecycle() {
    let app = open_app();

    let (status, _, body) = send(&app, Method::GET, "/api/todos", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        None,
        Some(json!({ "title": "Buy milk", "completed": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({ "id": 1, "title": "Buy milk", "completed": false }));

    let (status, _, list) = send(&app, Method::GET, "/api/todos", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created]));

    let (status, _, updated) = send(
        &app,
        Method::PUT,
        "/api/todos/1",
        None,
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({ "id": 1, "title": "Buy milk", "completed": true }));

    let (status, _, fetched) = send(&app, Method::GET, "/api/todos/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, _, body) = send(&app, Method::DELETE, "/api/todos/1", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, body) = send(&app, Method::GET, "/api/todos/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Todo not found" }));
}

#[tokio::test]
async fn test_create_honors_completed_and_trims_title() {
    let app = open_app();

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        None,
        Some(json!({ "title": "  Walk dog  ", "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Walk dog");
    assert_eq!(created["completed"], true);
}

#[tokio::test]
async fn test_update_missing_todo_is_404() {
    let app = open_app();

    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/todos/99",
        None,
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, Method::DELETE, "/api/todos/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_titles_are_rejected() {
    let app = open_app();

    let (status, _, body) = send(
        &app,
        Method::POST,
        "/api/todos",
        None,
        Some(json!({ "title": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("title"));

    send(&app, Method::POST, "/api/todos", None, Some(json!({ "title": "ok" }))).await;
    let (status, _, _) = send(
        &app,
        Method::PUT,
        "/api/todos/1",
        None,
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, _, fetched) = send(&app, Method::GET, "/api/todos/1", None, None).await;
    assert_eq!(fetched["title"], "ok");
}

#[tokio::test]
async fn test_malformed_requests() {
    let app = open_app();

    // Not JSON at all.
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["detail"].is_string());

    // Valid JSON, wrong shape.
    let (status, _, _) = send(
        &app,
        Method::POST,
        "/api/todos",
        None,
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Non-numeric id.
    let (status, _, body) = send(&app, Method::GET, "/api/todos/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_auth_routes_absent_when_disabled() {
    let app = open_app();

    let (status, _, _) = send(&app, Method::GET, "/api/auth/google", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send(&app, Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_todos_require_a_session() {
    let (app, _) = google_app();

    let (status, headers, body) = send(&app, Method::GET, "/api/todos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    assert_eq!(body, json!({ "detail": "not authenticated" }));

    let (status, _, _) = send(&app, Method::GET, "/api/todos", Some("Bearer garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Public routes stay public.
    let (status, _, _) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let (app, _) = google_app();
    let stale = SessionManager::new(SECRET, Duration::seconds(-60));
    let auth = bearer(&stale, "google-42");

    let (status, _, body) = send(&app, Method::GET, "/api/todos", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "session token has expired" }));
}

#[tokio::test]
async fn test_todos_are_scoped_to_their_owner() {
    let (app, sessions) = google_app();
    let alice = bearer(&sessions, "alice");
    let bob = bearer(&sessions, "bob");

    let (status, _, created) = send(
        &app,
        Method::POST,
        "/api/todos",
        Some(&alice),
        Some(json!({ "title": "Alice's todo" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/todos/{}", created["id"]);

    let (_, _, list) = send(&app, Method::GET, "/api/todos", Some(&bob), None).await;
    assert_eq!(list, json!([]));

    let (status, _, _) = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "completed": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bob),
        Some(json!({ "title": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, _, list) = send(&app, Method::GET, "/api/todos", Some(&alice), None).await;
    assert_eq!(list, json!([created]));
}

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let (app, sessions) = google_app();

    let (status, headers, _) = send(&app, Method::GET, "/api/auth/google", None, None).await;
    assert_eq!(status, StatusCode::FOUND);

    let url = location(&headers);
    assert_eq!(url.host_str(), Some("accounts.example.test"));
    let state = query_param(&url, "state").unwrap();
    sessions.verify_state(&state).unwrap();
}

#[tokio::test]
async fn test_callback_issues_session_and_me_returns_user() {
    let (app, sessions) = google_app();
    let state = sessions.issue_state().unwrap();

    let uri = format!("/api/auth/google/callback?code=good-code&state={state}");
    let (status, headers, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::FOUND);

    let redirect = location(&headers);
    assert_eq!(redirect.host_str(), Some("localhost"));
    assert_eq!(redirect.port(), Some(3000));
    let token = query_param(&redirect, "token").unwrap();
    assert_eq!(sessions.verify(&token).unwrap().sub, "google-42");

    let auth = format!("Bearer {token}");
    let (status, _, me) = send(&app, Method::GET, "/api/auth/me", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        me,
        json!({ "id": "google-42", "name": "Alice", "email": "alice@example.com" })
    );

    let (status, _, _) = send(&app, Method::POST, "/api/auth/logout", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_callback_failures() {
    let (app, sessions) = google_app();
    let state = sessions.issue_state().unwrap();

    // Consent denied at the provider.
    let (status, _, body) = send(
        &app,
        Method::GET,
        "/api/auth/google/callback?error=access_denied",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("access_denied"));

    // No code.
    let uri = format!("/api/auth/google/callback?state={state}");
    let (status, _, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Forged state.
    let (status, _, _) = send(
        &app,
        Method::GET,
        "/api/auth/google/callback?code=good-code&state=forged",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Code rejected by the provider.
    let uri = format!("/api/auth/google/callback?code=bad-code&state={state}");
    let (status, _, _) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Provider down.
    let uri = format!("/api/auth/google/callback?code=down&state={state}");
    let (status, _, body) = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_me_for_unknown_user_is_401() {
    let (app, sessions) = google_app();
    let auth = bearer(&sessions, "nobody");

    let (status, _, _) = send(&app, Method::GET, "/api/auth/me", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
