// SPDX-License-Identifier: MIT

//! Session lifecycle tests against the mock identity provider.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use missionsend_api::services::identity::MockIdentity;
use serde_json::json;
use tower::ServiceExt;

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn session_cookie_header(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Set-Cookie header missing")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_signup_sets_session_cookie() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/auth/signup",
            json!({ "email": "Ruth@Example.com", "password": "longenough1", "name": "Ruth" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = session_cookie_header(&response);
    assert!(cookie.starts_with("ms_token="), "cookie: {cookie}");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));

    // Email is lowercased before it reaches the provider.
    let body = common::body_json(response).await;
    assert_eq!(body["user_id"], "usr_ruth");
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let (app, state) = common::create_test_app();
    state.identity.set_mock(MockIdentity {
        duplicate_email: true,
        ..MockIdentity::default()
    });

    let response = app
        .oneshot(post_json(
            "/auth/signup",
            json!({ "email": "ruth@example.com", "password": "longenough1", "name": "Ruth" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "already_exists");
}

#[tokio::test]
async fn test_login_success_sets_cookie() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "ruth@example.com", "password": "longenough1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie_header(&response).starts_with("ms_token="));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, state) = common::create_test_app();
    state.identity.set_mock(MockIdentity {
        reject_credentials: true,
        ..MockIdentity::default()
    });

    let response = app
        .oneshot(post_json(
            "/auth/login",
            json!({ "email": "ruth@example.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/logout")
                .header(header::COOKIE, "ms_token=whatever")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // Removal cookie: empty value, immediate expiry.
    let cookie = session_cookie_header(&response);
    assert!(cookie.starts_with("ms_token="), "cookie: {cookie}");
    assert!(cookie.contains("Max-Age=0"), "cookie: {cookie}");
}
