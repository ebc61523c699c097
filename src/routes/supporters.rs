// SPDX-License-Identifier: MIT

//! Trip supporter routes: followers and prayer intercessors.
//!
//! Join rows are created when a supporter accepts an invitation and removed
//! by the trip owner (or by the supporter leaving).

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{PrayerIntercessor, TripFollower};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trips/{id}/followers", post(follow_trip))
        .route("/api/trips/{id}/followers/{user_id}", delete(remove_follower))
        .route("/api/trips/{id}/intercessors", post(intercede_for_trip))
        .route(
            "/api/trips/{id}/intercessors/{user_id}",
            delete(remove_intercessor),
        )
        .route("/api/trips/{id}/supporters", get(list_supporters))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Accept a follow invitation: the caller becomes a follower of the trip.
/// Re-accepting is idempotent.
async fn follow_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let trip = state
        .db
        .get_trip(&trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", trip_id)))?;

    if trip.created_by == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot follow your own trip".to_string(),
        ));
    }

    state
        .db
        .add_follower(&TripFollower {
            trip_id: trip.id.clone(),
            user_id: user.user_id.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await?;

    Ok(Json(MessageResponse {
        message: format!("You are now following \"{}\".", trip.name),
    }))
}

/// Remove a follower. Allowed for the trip owner, or for followers removing
/// themselves.
async fn remove_follower(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((trip_id, target_user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    require_owner_or_self(&state, &trip_id, &user.user_id, &target_user_id).await?;

    state.db.remove_follower(&trip_id, &target_user_id).await?;

    Ok(Json(MessageResponse {
        message: "Follower removed.".to_string(),
    }))
}

/// Accept a prayer invitation: the caller becomes an intercessor for the trip.
async fn intercede_for_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let trip = state
        .db
        .get_trip(&trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", trip_id)))?;

    if trip.created_by == user.user_id {
        return Err(AppError::BadRequest(
            "You cannot intercede for your own trip".to_string(),
        ));
    }

    state
        .db
        .add_intercessor(&PrayerIntercessor {
            trip_id: trip.id.clone(),
            user_id: user.user_id.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await?;

    Ok(Json(MessageResponse {
        message: format!("You are now praying for \"{}\".", trip.name),
    }))
}

/// Remove an intercessor. Same permission rule as followers.
async fn remove_intercessor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((trip_id, target_user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    require_owner_or_self(&state, &trip_id, &user.user_id, &target_user_id).await?;

    state.db.remove_intercessor(&trip_id, &target_user_id).await?;

    Ok(Json(MessageResponse {
        message: "Intercessor removed.".to_string(),
    }))
}

#[derive(Serialize)]
pub struct SupportersResponse {
    pub followers: Vec<TripFollower>,
    pub intercessors: Vec<PrayerIntercessor>,
}

/// List a trip's supporters. Trip owner only.
async fn list_supporters(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<SupportersResponse>> {
    let trip = super::trips::load_owned_trip(&state, &trip_id, &user.user_id).await?;

    let followers = state.db.list_followers_for_trip(&trip.id).await?;
    let intercessors = state.db.list_intercessors_for_trip(&trip.id).await?;

    Ok(Json(SupportersResponse {
        followers,
        intercessors,
    }))
}

/// Caller must be the trip owner, or be removing their own join row.
async fn require_owner_or_self(
    state: &Arc<AppState>,
    trip_id: &str,
    caller_id: &str,
    target_user_id: &str,
) -> Result<()> {
    if caller_id == target_user_id {
        return Ok(());
    }

    super::trips::load_owned_trip(state, trip_id, caller_id).await?;
    Ok(())
}
