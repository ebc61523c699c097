// SPDX-License-Identifier: MIT

//! Donation routes.
//!
//! The processing fee is computed server-side from the configured constants;
//! the client never supplies fee or total. Ledger rows are immutable except
//! for the `receipt_sent` flag.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Donation, NotificationKind};
use crate::services::fees;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MAX_DONATION_AMOUNT: f64 = 1_000_000.0;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/donations", post(create_donation).get(list_my_donations))
        .route("/api/donations/{id}/receipt", post(mark_receipt_sent))
        .route("/api/trips/{id}/donations", get(list_trip_donations))
}

#[derive(Deserialize)]
pub struct CreateDonationRequest {
    trip_id: String,
    /// Gross amount in currency units
    amount: f64,
}

#[derive(Serialize)]
pub struct DonationResponse {
    pub message: String,
    pub donation: Donation,
}

/// Record a donation to a trip.
///
/// Validates the amount, computes fee and total, writes the ledger row and
/// bumps the trip's raised total atomically, then notifies the trip owner in
/// the background.
async fn create_donation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateDonationRequest>,
) -> Result<Json<DonationResponse>> {
    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err(AppError::BadRequest(
            "Donation amount must be greater than zero".to_string(),
        ));
    }
    if payload.amount > MAX_DONATION_AMOUNT {
        return Err(AppError::BadRequest(format!(
            "Donation amount must not exceed {}",
            MAX_DONATION_AMOUNT
        )));
    }
    if payload.trip_id.trim().is_empty() {
        return Err(AppError::BadRequest("trip_id is required".to_string()));
    }

    let trip = state
        .db
        .get_trip(&payload.trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Trip {} not found", payload.trip_id)))?;

    let amount = fees::round2(payload.amount);
    let processing_fee = fees::processing_fee(amount, &state.config.fees);
    let total_charged = fees::total_with_fee(amount, &state.config.fees);

    let donation = Donation {
        id: crate::db::FirestoreDb::new_row_id(),
        trip_id: trip.id.clone(),
        created_by: user.user_id.clone(),
        amount,
        processing_fee,
        total_charged,
        receipt_sent: false,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.record_donation_atomic(&donation).await?;

    state.notifier.notify_later(
        &trip.created_by,
        NotificationKind::DonationReceived,
        "Donation received",
        &format!("\"{}\" received a donation of ${:.2}.", trip.name, amount),
        Some(trip.id.clone()),
    );

    Ok(Json(DonationResponse {
        message: format!(
            "Thank you! ${:.2} donated (${:.2} total with processing fee).",
            amount, total_charged
        ),
        donation,
    }))
}

#[derive(Serialize)]
pub struct DonationsResponse {
    pub donations: Vec<Donation>,
}

/// The caller's giving history.
async fn list_my_donations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DonationsResponse>> {
    let donations = state.db.list_donations_for_donor(&user.user_id).await?;
    Ok(Json(DonationsResponse { donations }))
}

/// Donations received by a trip. Trip owner only.
async fn list_trip_donations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(trip_id): Path<String>,
) -> Result<Json<DonationsResponse>> {
    let trip = super::trips::load_owned_trip(&state, &trip_id, &user.user_id).await?;
    let donations = state.db.list_donations_for_trip(&trip.id).await?;
    Ok(Json(DonationsResponse { donations }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Mark a donation's receipt as sent. Only the owner of the receiving trip
/// may flip the flag; it is the one mutation a ledger row permits.
async fn mark_receipt_sent(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(donation_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let mut donation = state
        .db
        .get_donation(&donation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Donation {} not found", donation_id)))?;

    // Ownership is through the receiving trip, not the donor.
    super::trips::load_owned_trip(&state, &donation.trip_id, &user.user_id).await?;

    donation.receipt_sent = true;
    state.db.mark_receipt_sent(&donation).await?;

    Ok(Json(MessageResponse {
        message: "Receipt marked as sent.".to_string(),
    }))
}
