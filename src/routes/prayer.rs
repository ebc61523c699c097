// SPDX-License-Identifier: MIT

//! Prayer request routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::PrayerRequest;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/prayer-requests",
            get(list_prayer_requests).post(create_prayer_request),
        )
        .route("/api/prayer-requests/{id}", patch(update_prayer_request))
}

#[derive(Deserialize, Validate)]
pub struct CreatePrayerRequestBody {
    #[validate(length(min = 2, max = 200))]
    title: String,
    #[validate(length(min = 1, max = 5000))]
    body: String,
    trip_id: Option<String>,
}

#[derive(Serialize)]
pub struct PrayerRequestResponse {
    pub message: String,
    pub prayer_request: PrayerRequest,
}

/// Post a prayer request, optionally tied to one of the caller's trips.
async fn create_prayer_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreatePrayerRequestBody>,
) -> Result<Json<PrayerRequestResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(trip_id) = &payload.trip_id {
        // The trip reference must be one of the caller's own trips.
        super::trips::load_owned_trip(&state, trip_id, &user.user_id).await?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let request = PrayerRequest {
        id: crate::db::FirestoreDb::new_row_id(),
        created_by: user.user_id.clone(),
        trip_id: payload.trip_id,
        title: payload.title.trim().to_string(),
        body: payload.body,
        is_answered: false,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.create_prayer_request(&request).await?;

    Ok(Json(PrayerRequestResponse {
        message: "Prayer request posted.".to_string(),
        prayer_request: request,
    }))
}

#[derive(Serialize)]
pub struct PrayerRequestsResponse {
    pub prayer_requests: Vec<PrayerRequest>,
}

/// The caller's prayer requests, newest first.
async fn list_prayer_requests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PrayerRequestsResponse>> {
    let prayer_requests = state
        .db
        .list_prayer_requests_for_owner(&user.user_id)
        .await?;
    Ok(Json(PrayerRequestsResponse { prayer_requests }))
}

#[derive(Deserialize, Validate)]
pub struct UpdatePrayerRequestBody {
    #[validate(length(min = 2, max = 200))]
    title: Option<String>,
    #[validate(length(min = 1, max = 5000))]
    body: Option<String>,
    is_answered: Option<bool>,
}

/// Update one of the caller's prayer requests (edit text, mark answered).
async fn update_prayer_request(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(request_id): Path<String>,
    Json(payload): Json<UpdatePrayerRequestBody>,
) -> Result<Json<PrayerRequestResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut request = state
        .db
        .get_prayer_request(&request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Prayer request not found".to_string()))?;

    if request.created_by != user.user_id {
        return Err(AppError::Forbidden(
            "You do not own this prayer request".to_string(),
        ));
    }

    if let Some(title) = payload.title {
        request.title = title.trim().to_string();
    }
    if let Some(body) = payload.body {
        request.body = body;
    }
    if let Some(answered) = payload.is_answered {
        request.is_answered = answered;
    }
    request.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.update_prayer_request(&request).await?;

    Ok(Json(PrayerRequestResponse {
        message: "Prayer request updated.".to_string(),
        prayer_request: request,
    }))
}
