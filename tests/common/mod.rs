// SPDX-License-Identifier: MIT

use missionsend_api::config::Config;
use missionsend_api::db::FirestoreDb;
use missionsend_api::middleware::auth::create_jwt;
use missionsend_api::routes::create_router;
use missionsend_api::services::{IdentityService, Notifier};
use missionsend_api::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let identity = Arc::new(IdentityService::new_mock());
    let notifier = Notifier::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity,
        notifier,
    });

    (create_router(state.clone()), state)
}

/// Create a test app backed by the Firestore emulator.
/// Identity stays mocked (verified by default).
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore emulator");
    let identity = Arc::new(IdentityService::new_mock());
    let notifier = Notifier::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity,
        notifier,
    });

    (create_router(state.clone()), state)
}

/// Mint a session JWT for tests.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("JWT creation failed")
}

/// Read a response body into a JSON value.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}
