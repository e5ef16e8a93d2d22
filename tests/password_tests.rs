// SPDX-License-Identifier: MIT

//! Password change and reset flows.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let (app, _) = common::create_test_app();
    let (user_id, access, _) =
        common::sign_up_and_log_in(&app, "555-0001", "a@example.com", "pw-old").await;

    let (status, body) = common::put_json(
        &app,
        &format!("/api/users/{}/password", user_id),
        json!({ "old_password": "wrong", "new_password": "pw-new" }),
        Some(&access),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
}

#[tokio::test]
async fn test_change_password_swaps_credentials() {
    let (app, _) = common::create_test_app();
    let (user_id, access, _) =
        common::sign_up_and_log_in(&app, "555-0001", "a@example.com", "pw-old").await;

    let (status, _) = common::put_json(
        &app,
        &format!("/api/users/{}/password", user_id),
        json!({ "old_password": "pw-old", "new_password": "pw-new" }),
        Some(&access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer logs in.
    let (status, _) = common::post_json(
        &app,
        "/auth/login",
        json!({ "phone_number": "555-0001", "password": "pw-old" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // New password does.
    let (status, _) = common::post_json(
        &app,
        "/auth/login",
        json!({ "phone_number": "555-0001", "password": "pw-new" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_overwrites_by_email() {
    let (app, _) = common::create_test_app();
    common::sign_up_and_log_in(&app, "555-0001", "a@example.com", "pw-old").await;

    let (status, _) = common::post_json(
        &app,
        "/auth/forgot-password",
        json!({ "email": "a@example.com", "new_password": "pw-reset" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::post_json(
        &app,
        "/auth/login",
        json!({ "phone_number": "555-0001", "password": "pw-reset" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_unknown_email_is_not_found() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::post_json(
        &app,
        "/auth/forgot-password",
        json!({ "email": "nobody@example.com", "new_password": "pw-reset" }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}
