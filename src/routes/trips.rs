// SPDX-License-Identifier: MIT

//! Trip CRUD routes.
//!
//! Every mutation checks `created_by` against the caller after reading and
//! before writing.

use crate::db::TripQueryCursor;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Trip;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trips", get(list_trips).post(create_trip))
        .route(
            "/api/trips/{id}",
            get(get_trip).patch(update_trip).delete(delete_trip),
        )
}

// ─── Cursors ─────────────────────────────────────────────────

fn parse_cursor(cursor: Option<&str>) -> Result<Option<TripQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let (created_at, trip_id) =
                decoded_str.split_once('|').ok_or_else(invalid_cursor)?;
            if created_at.is_empty() || trip_id.is_empty() {
                return Err(invalid_cursor());
            }

            Ok(TripQueryCursor {
                created_at: created_at.to_string(),
                trip_id: trip_id.to_string(),
            })
        })
        .transpose()
}

fn encode_cursor(cursor: &TripQueryCursor) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}|{}", cursor.created_at, cursor.trip_id))
}

// ─── List / Create ───────────────────────────────────────────

#[derive(Deserialize)]
struct TripsQuery {
    /// Cursor for forward pagination (opaque token)
    cursor: Option<String>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    20
}

#[derive(Serialize)]
pub struct TripsResponse {
    pub trips: Vec<Trip>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// List the caller's trips, newest first.
async fn list_trips(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TripsQuery>,
) -> Result<Json<TripsResponse>> {
    let limit = params.per_page.min(MAX_PER_PAGE).max(1);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra row to know whether another page exists.
    let mut trips = state
        .db
        .list_trips_for_owner(&user.user_id, cursor, limit.saturating_add(1))
        .await?;

    let has_more = trips.len() > limit as usize;
    if has_more {
        trips.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        trips.last().map(|t| {
            encode_cursor(&TripQueryCursor {
                created_at: t.created_at.clone(),
                trip_id: t.id.clone(),
            })
        })
    } else {
        None
    };

    Ok(Json(TripsResponse {
        trips,
        per_page: limit,
        next_cursor,
    }))
}

#[derive(Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 2, max = 200))]
    name: String,
    #[validate(length(max = 5000))]
    description: String,
    #[validate(range(min = 0.01, max = 10_000_000.0))]
    goal_amount: f64,
    #[serde(default)]
    restricted_country: bool,
    /// RFC 3339
    start_date: String,
    end_date: String,
    #[serde(default)]
    media_file_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct TripResponse {
    pub message: String,
    pub trip: Trip,
}

/// Create a trip. New trips start inactive; activation is a separate update
/// that carries the activation fee.
async fn create_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateTripRequest>,
) -> Result<Json<TripResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (start, end) = parse_date_range(&payload.start_date, &payload.end_date)?;
    let now = chrono::Utc::now().to_rfc3339();

    let trip = Trip {
        id: crate::db::FirestoreDb::new_row_id(),
        created_by: user.user_id.clone(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        goal_amount: crate::services::fees::round2(payload.goal_amount),
        raised_amount: 0.0,
        is_active: false,
        restricted_country: payload.restricted_country,
        start_date: start.to_rfc3339(),
        end_date: end.to_rfc3339(),
        media_file_ids: payload.media_file_ids,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.create_trip(&trip).await?;

    tracing::info!(trip_id = %trip.id, user_id = %user.user_id, "Trip created");

    Ok(Json(TripResponse {
        message: "Trip created.".to_string(),
        trip,
    }))
}

// ─── Get / Update / Delete ───────────────────────────────────

/// Get one of the caller's trips.
async fn get_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<Trip>> {
    let trip = load_owned_trip(&state, &trip_id, &user.user_id).await?;
    Ok(Json(trip))
}

#[derive(Deserialize, Validate)]
pub struct UpdateTripRequest {
    #[validate(length(min = 2, max = 200))]
    name: Option<String>,
    #[validate(length(max = 5000))]
    description: Option<String>,
    #[validate(range(min = 0.01, max = 10_000_000.0))]
    goal_amount: Option<f64>,
    is_active: Option<bool>,
    restricted_country: Option<bool>,
    start_date: Option<String>,
    end_date: Option<String>,
    media_file_ids: Option<Vec<String>>,
}

/// Update a trip. Activating a trip surfaces the one-time activation fee in
/// the response message.
async fn update_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
    Json(payload): Json<UpdateTripRequest>,
) -> Result<Json<TripResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut trip = load_owned_trip(&state, &trip_id, &user.user_id).await?;
    let newly_activated = payload.is_active == Some(true) && !trip.is_active;

    if let Some(name) = payload.name {
        trip.name = name.trim().to_string();
    }
    if let Some(description) = payload.description {
        trip.description = description;
    }
    if let Some(goal) = payload.goal_amount {
        trip.goal_amount = crate::services::fees::round2(goal);
    }
    if let Some(active) = payload.is_active {
        trip.is_active = active;
    }
    if let Some(restricted) = payload.restricted_country {
        trip.restricted_country = restricted;
    }
    if payload.start_date.is_some() || payload.end_date.is_some() {
        let start = payload.start_date.as_deref().unwrap_or(&trip.start_date);
        let end = payload.end_date.as_deref().unwrap_or(&trip.end_date);
        let (start, end) = parse_date_range(start, end)?;
        trip.start_date = start.to_rfc3339();
        trip.end_date = end.to_rfc3339();
    }
    if let Some(media) = payload.media_file_ids {
        trip.media_file_ids = media;
    }
    trip.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.update_trip(&trip).await?;

    let message = if newly_activated {
        format!(
            "Trip activated. A one-time activation fee of ${:.2} applies.",
            state.config.fees.trip_activation_fee
        )
    } else {
        "Trip updated.".to_string()
    };

    Ok(Json(TripResponse { message, trip }))
}

#[derive(Serialize)]
pub struct DeleteTripResponse {
    pub message: String,
    pub deleted_rows: usize,
}

/// Delete a trip, cascading to follower/intercessor rows and notifications.
/// Donation ledger rows are retained.
async fn delete_trip(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<DeleteTripResponse>> {
    let trip = load_owned_trip(&state, &trip_id, &user.user_id).await?;

    let deleted_rows = state.db.delete_trip_cascade(&trip.id).await?;

    Ok(Json(DeleteTripResponse {
        message: "Trip deleted.".to_string(),
        deleted_rows,
    }))
}

// ─── Helpers ─────────────────────────────────────────────────

/// Load a trip and require the caller to be its owner.
pub(crate) async fn load_owned_trip(
    state: &Arc<AppState>,
    trip_id: &str,
    user_id: &str,
) -> Result<Trip> {
    let trip = state
        .db
        .get_trip(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", trip_id)))?;

    if trip.created_by != user_id {
        return Err(AppError::Forbidden(
            "You do not own this trip".to_string(),
        ));
    }

    Ok(trip)
}

fn parse_date_range(
    start: &str,
    end: &str,
) -> Result<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)> {
    let parse = |raw: &str, which: &str| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|_| {
                AppError::BadRequest(format!("Invalid '{}': must be RFC3339 datetime", which))
            })
    };

    let start = parse(start, "start_date")?;
    let end = parse(end, "end_date")?;

    if end < start {
        return Err(AppError::BadRequest(
            "end_date must not be before start_date".to_string(),
        ));
    }

    Ok((start, end))
}
