// SPDX-License-Identifier: MIT

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use fleetpass::config::Config;
use fleetpass::db::UserStore;
use fleetpass::routes::create_router;
use fleetpass::services::{SessionCache, TokenService, UserService};
use fleetpass::AppState;
use std::sync::Arc;
use tower::ServiceExt; // for oneshot

/// Create a test app over the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let store = UserStore::in_memory();
    let sessions = SessionCache::new();
    let tokens = TokenService::new(&config.jwt_signing_key);
    let users = UserService::new(store, sessions, tokens.clone());

    let state = Arc::new(AppState {
        config,
        tokens,
        users,
    });

    (create_router(state.clone()), state)
}

/// POST a JSON body, returning status and parsed response body.
#[allow(dead_code)]
pub async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    read_response(response).await
}

/// PUT a JSON body, returning status and parsed response body.
#[allow(dead_code)]
pub async fn put_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    read_response(response).await
}

/// GET, returning status and parsed response body.
#[allow(dead_code)]
pub async fn get(
    app: &axum::Router,
    uri: &str,
    bearer: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    read_response(response).await
}

async fn read_response(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

/// Register a user and log in, returning (user_id, access, refresh).
#[allow(dead_code)]
pub async fn sign_up_and_log_in(
    app: &axum::Router,
    phone_number: &str,
    email: &str,
    password: &str,
) -> (u64, String, String) {
    let (status, _) = post_json(
        app,
        "/auth/signup",
        serde_json::json!({
            "name": "Test Rider",
            "phone_number": phone_number,
            "email": email,
            "password": password,
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup should succeed");

    let (status, body) = post_json(
        app,
        "/auth/login",
        serde_json::json!({
            "phone_number": phone_number,
            "password": password,
        }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login should succeed");

    (
        body["user_id"].as_u64().unwrap(),
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}
