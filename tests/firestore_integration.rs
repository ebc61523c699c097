// SPDX-License-Identifier: MIT

//! End-to-end flows against the Firestore emulator.
//!
//! Run with `FIRESTORE_EMULATOR_HOST=localhost:8080 cargo test`; each test
//! skips itself when the emulator is not reachable. User IDs carry a
//! per-run nonce so reruns never collide with leftover documents.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

fn run_nonce() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn request(
    method: Method,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn profile_body(name: &str, email: &str) -> serde_json::Value {
    json!({
        "category": "missionary",
        "display_name": name,
        "email": email,
        "phone": "+1 (650) 555-0199",
    })
}

#[tokio::test]
async fn test_profile_lock_unlock_rotation_flow() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;
    let user_id = format!("usr_lockflow_{}", run_nonce());
    let token = common::create_test_jwt(&user_id, &state.config.jwt_signing_key);

    // Onboard.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/profile",
            &token,
            Some(profile_body("Ruth Fields", "ruth@example.com")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["profile"]["account_locked"], false);
    // The unlock key is never part of a profile payload.
    assert!(body["profile"].get("unlock_key").is_none());

    // A second onboarding attempt for the same identity conflicts.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/profile",
            &token,
            Some(profile_body("Ruth Again", "ruth@example.com")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Read the unlock key from the dedicated endpoint.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/account/unlock-key", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let key = common::body_json(response).await["unlock_key"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(key.len(), 255);

    // Dashboard is open while unlocked.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/trips", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Lock.
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/account/lock", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Dashboard is now shut, with the lock-specific status.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/trips", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOCKED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "account_locked");

    // So is the unlock-key read: a hijacked locked session cannot fetch it.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/account/unlock-key", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOCKED);

    // Wrong key of the right length is refused and the lock holds.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/unlock",
            &token,
            Some(json!({ "unlock_key": "a".repeat(255) })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/trips", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOCKED);

    // The real key unlocks.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/unlock",
            &token,
            Some(json!({ "unlock_key": key })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["account_locked"], false);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/trips", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The key was rotated on unlock; the spent one is gone.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/account/unlock-key", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = common::body_json(response).await["unlock_key"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(rotated.len(), 255);
    assert_ne!(rotated, key);
}

#[tokio::test]
async fn test_profile_round_trip_returns_normalized_fields() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;
    let user_id = format!("usr_normalize_{}", run_nonce());
    let token = common::create_test_jwt(&user_id, &state.config.jwt_signing_key);

    // Messy input: padded name, mixed-case email, formatted phone.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/profile",
            &token,
            Some(json!({
                "category": "missionary",
                "display_name": "  Ruth Fields  ",
                "email": "Ruth@Example.COM",
                "phone": "+1 (650) 555-0199",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Reading the profile back returns the stored, normalized values.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/account/profile", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["profile"]["display_name"], "Ruth Fields");
    assert_eq!(body["profile"]["email"], "ruth@example.com");
    assert_eq!(body["profile"]["phone"], "+16505550199");
}

#[tokio::test]
async fn test_trip_and_donation_flow() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;
    let nonce = run_nonce();

    let owner_id = format!("usr_owner_{nonce}");
    let donor_id = format!("usr_donor_{nonce}");
    let owner = common::create_test_jwt(&owner_id, &state.config.jwt_signing_key);
    let donor = common::create_test_jwt(&donor_id, &state.config.jwt_signing_key);

    for (token, name, email) in [
        (&owner, "Owner", "owner@example.com"),
        (&donor, "Donor", "donor@example.com"),
    ] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/account/profile",
                token,
                Some(profile_body(name, email)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Create a trip; it starts inactive.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/trips",
            &owner,
            Some(json!({
                "name": "Summer outreach",
                "description": "Six weeks in-country.",
                "goal_amount": 5000.0,
                "start_date": "2026-06-01T00:00:00Z",
                "end_date": "2026-07-15T00:00:00Z",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let trip_id = body["trip"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["trip"]["is_active"], false);

    // Donations to an inactive trip are refused.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/donations",
            &donor,
            Some(json!({ "trip_id": trip_id, "amount": 50.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Activate; the one-time fee is surfaced in the message.
    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/trips/{trip_id}"),
            &owner,
            Some(json!({ "is_active": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("$10.00"));

    // Nonsense amounts never reach the ledger.
    for amount in [json!(0.0), json!(-5.0), json!(2_000_000.0)] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/donations",
                &donor,
                Some(json!({ "trip_id": trip_id, "amount": amount })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // A real donation: server-computed fee and total.
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/donations",
            &donor,
            Some(json!({ "trip_id": trip_id, "amount": 50.0 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["donation"]["amount"].as_f64().unwrap(), 50.0);
    assert_eq!(body["donation"]["processing_fee"].as_f64().unwrap(), 1.75);
    assert_eq!(body["donation"]["total_charged"].as_f64().unwrap(), 51.75);

    // The trip's raised total moved atomically with the ledger row.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/trips/{trip_id}"),
            &owner,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["raised_amount"].as_f64().unwrap(), 50.0);

    // Only the trip owner sees its donations.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/trips/{trip_id}/donations"),
            &donor,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/trips/{trip_id}/donations"),
            &owner,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["donations"].as_array().unwrap().len(), 1);

    // Deleting the trip keeps the donation ledger.
    let response = app
        .clone()
        .oneshot(request(
            Method::DELETE,
            &format!("/api/trips/{trip_id}"),
            &owner,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/donations", &donor, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["donations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_donations_never_lose_an_update() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;
    let nonce = run_nonce();

    let owner_id = format!("usr_race_owner_{nonce}");
    let donor_a_id = format!("usr_race_a_{nonce}");
    let donor_b_id = format!("usr_race_b_{nonce}");
    let owner = common::create_test_jwt(&owner_id, &state.config.jwt_signing_key);
    let donor_a = common::create_test_jwt(&donor_a_id, &state.config.jwt_signing_key);
    let donor_b = common::create_test_jwt(&donor_b_id, &state.config.jwt_signing_key);

    for (token, name, email) in [
        (&owner, "Race Owner", "race-owner@example.com"),
        (&donor_a, "Donor A", "race-a@example.com"),
        (&donor_b, "Donor B", "race-b@example.com"),
    ] {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/account/profile",
                token,
                Some(profile_body(name, email)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/trips",
            &owner,
            Some(json!({
                "name": "Race trip",
                "description": "",
                "goal_amount": 1000.0,
                "start_date": "2026-06-01T00:00:00Z",
                "end_date": "2026-06-30T00:00:00Z",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let trip_id = common::body_json(response).await["trip"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(request(
            Method::PATCH,
            &format!("/api/trips/{trip_id}"),
            &owner,
            Some(json!({ "is_active": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Two donations land at the same time. A commit may abort on conflict,
    // but the raised total must reflect exactly the donations that
    // succeeded; a silently lost increment fails this.
    let first = app.clone().oneshot(request(
        Method::POST,
        "/api/donations",
        &donor_a,
        Some(json!({ "trip_id": trip_id, "amount": 50.0 })),
    ));
    let second = app.clone().oneshot(request(
        Method::POST,
        "/api/donations",
        &donor_b,
        Some(json!({ "trip_id": trip_id, "amount": 50.0 })),
    ));
    let (first, second) = tokio::join!(first, second);

    let successes = [first.unwrap(), second.unwrap()]
        .into_iter()
        .filter(|r| r.status() == StatusCode::OK)
        .count();
    assert!(successes >= 1, "no donation committed");

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/trips/{trip_id}"),
            &owner,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(
        body["raised_amount"].as_f64().unwrap(),
        50.0 * successes as f64
    );
}

#[tokio::test]
async fn test_trip_pagination_cursor() {
    require_emulator!();
    let (app, state) = common::create_emulator_app().await;
    let user_id = format!("usr_pager_{}", run_nonce());
    let token = common::create_test_jwt(&user_id, &state.config.jwt_signing_key);

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/account/profile",
            &token,
            Some(profile_body("Pager", "pager@example.com")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut created_ids = std::collections::HashSet::new();
    for i in 0..5 {
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/trips",
                &token,
                Some(json!({
                    "name": format!("Trip {i}"),
                    "description": "",
                    "goal_amount": 100.0,
                    "start_date": "2026-06-01T00:00:00Z",
                    "end_date": "2026-06-30T00:00:00Z",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = common::body_json(response).await;
        created_ids.insert(body["trip"]["id"].as_str().unwrap().to_string());
    }

    // Page 1 of 2.
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/trips?per_page=3", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let first_page: Vec<String> = body["trips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(first_page.len(), 3);
    let cursor = body["next_cursor"].as_str().unwrap().to_string();

    // Page 2: the remainder, no further cursor.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            &format!("/api/trips?per_page=3&cursor={cursor}"),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let second_page: Vec<String> = body["trips"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(second_page.len(), 2);
    assert!(body["next_cursor"].is_null());

    // The two pages partition the full set: nothing skipped at the
    // boundary, nothing repeated, even for trips created back-to-back
    // within the same timestamp.
    let paged: std::collections::HashSet<String> = first_page
        .iter()
        .chain(second_page.iter())
        .cloned()
        .collect();
    assert_eq!(paged.len(), 5);
    assert_eq!(paged, created_ids);

    // A mangled cursor is a client error.
    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/trips?cursor=%21%21not-a-cursor",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
