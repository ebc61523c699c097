// SPDX-License-Identifier: MIT

//! Account safety & verification routes.
//!
//! Profile lifecycle, the emergency lock state machine, unlock-key handling,
//! verification status, 2FA, and password changes. Everything here requires a
//! session; only the unlock-key read additionally requires an unlocked
//! account (it is mounted behind the dashboard guard in `routes::mod`).

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AccountCategory, NotificationKind, UserProfile, VerificationStatus};
use crate::phone::normalize_phone;
use crate::services::identity::TotpEnrollment;
use crate::services::unlock::{generate_unlock_key, keys_match, UNLOCK_KEY_LEN};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Account routes available to any authenticated session, locked or not.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/account/profile",
            post(create_profile).get(get_profile).patch(update_profile),
        )
        .route("/account/lock", post(lock_account))
        .route("/account/unlock", post(unlock_account))
        .route("/account/verification-status", get(verification_status))
        .route("/account/verification/email", post(send_email_verification))
        .route("/account/verification/phone", post(send_phone_verification))
        .route(
            "/account/two-factor",
            post(create_two_factor).delete(disable_two_factor),
        )
        .route("/account/two-factor/verify", post(verify_two_factor))
        .route("/account/password", post(change_password))
}

/// Account routes confined to verified, unlocked sessions.
pub fn guarded_routes() -> Router<Arc<AppState>> {
    Router::new().route("/account/unlock-key", get(get_unlock_key))
}

// ─── Profile Lifecycle ───────────────────────────────────────

/// Profile as returned to the API. Never includes the unlock key.
#[derive(Serialize)]
pub struct ProfileView {
    pub user_id: String,
    pub category: AccountCategory,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub is_501c3: bool,
    pub tax_deductible: bool,
    pub payment_account_id: Option<String>,
    pub account_locked: bool,
    pub two_factor_enabled: bool,
    pub created_at: String,
}

impl From<UserProfile> for ProfileView {
    fn from(p: UserProfile) -> Self {
        Self {
            user_id: p.user_id,
            category: p.category,
            display_name: p.display_name,
            email: p.email,
            phone: p.phone,
            address: p.address,
            emergency_contact: p.emergency_contact,
            is_501c3: p.is_501c3,
            tax_deductible: p.tax_deductible,
            payment_account_id: p.payment_account_id,
            account_locked: p.account_locked,
            two_factor_enabled: p.two_factor_enabled,
            created_at: p.created_at,
        }
    }
}

#[derive(Deserialize, Validate)]
pub struct CreateProfileRequest {
    category: AccountCategory,
    #[validate(length(min = 2, max = 100))]
    display_name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 1, max = 50))]
    phone: String,
    #[validate(length(max = 500))]
    address: Option<String>,
    #[validate(length(max = 1000))]
    emergency_contact: Option<String>,
    #[serde(default)]
    is_501c3: bool,
    #[serde(default)]
    tax_deductible: bool,
    payment_account_id: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub profile: ProfileView,
}

/// Create the caller's profile.
///
/// All validation happens before any store call. The fresh unlock key is
/// written with the profile but never returned here; the owner reads it once
/// from `GET /account/unlock-key`.
async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let phone = normalize_phone(&payload.phone)?;
    let now = chrono::Utc::now().to_rfc3339();

    let profile = UserProfile {
        user_id: user.user_id.clone(),
        category: payload.category,
        display_name: payload.display_name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        phone,
        address: payload.address,
        emergency_contact: payload.emergency_contact,
        is_501c3: payload.is_501c3,
        tax_deductible: payload.tax_deductible,
        payment_account_id: payload.payment_account_id,
        unlock_key: generate_unlock_key()?,
        account_locked: false,
        two_factor_enabled: false,
        created_at: now.clone(),
        updated_at: now,
    };

    state.db.create_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, category = ?profile.category, "Profile created");

    Ok(Json(ProfileResponse {
        message: "Profile created. Save your unlock key somewhere safe.".to_string(),
        profile: profile.into(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100))]
    display_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    phone: Option<String>,
    #[validate(length(max = 500))]
    address: Option<String>,
    #[validate(length(max = 1000))]
    emergency_contact: Option<String>,
    is_501c3: Option<bool>,
    tax_deductible: Option<bool>,
}

/// Update the mutable profile fields.
///
/// Email and account category are immutable post-creation; requests carrying
/// them are rejected by the DTO shape rather than silently ignored.
async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    if let Some(name) = payload.display_name {
        profile.display_name = name.trim().to_string();
    }
    if let Some(phone) = payload.phone {
        profile.phone = normalize_phone(&phone)?;
    }
    if let Some(address) = payload.address {
        profile.address = Some(address);
    }
    if let Some(contact) = payload.emergency_contact {
        profile.emergency_contact = Some(contact);
    }
    if let Some(flag) = payload.is_501c3 {
        profile.is_501c3 = flag;
    }
    if let Some(flag) = payload.tax_deductible {
        profile.tax_deductible = flag;
    }
    profile.updated_at = chrono::Utc::now().to_rfc3339();

    state.db.update_profile(&profile).await?;

    Ok(Json(ProfileResponse {
        message: "Profile updated.".to_string(),
        profile: profile.into(),
    }))
}

#[derive(Serialize)]
pub struct GetProfileResponse {
    /// `null` when the identity has not completed onboarding; this is a
    /// normal state, not an error.
    pub profile: Option<ProfileView>,
}

/// Get the caller's profile, if onboarding has been completed.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<GetProfileResponse>> {
    let profile = state.db.get_profile(&user.user_id).await?;
    Ok(Json(GetProfileResponse {
        profile: profile.map(ProfileView::from),
    }))
}

// ─── Emergency Lock State Machine ────────────────────────────

#[derive(Serialize)]
pub struct LockResponse {
    pub message: String,
    pub account_locked: bool,
}

/// Lock the caller's account.
///
/// Unconditional: any authenticated owner can lock, even while already
/// locked (idempotent). Follower notification fan-out is best-effort and
/// happens after the lock is committed.
async fn lock_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<LockResponse>> {
    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    profile.account_locked = true;
    profile.updated_at = chrono::Utc::now().to_rfc3339();
    state.db.set_lock_state(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Account locked");

    state.notifier.notify_followers_of_lock(&user.user_id);

    Ok(Json(LockResponse {
        message: "Your account is locked. Use your unlock key to restore access.".to_string(),
        account_locked: true,
    }))
}

#[derive(Deserialize)]
pub struct UnlockRequest {
    unlock_key: String,
}

/// Unlock the caller's account with the current unlock key.
///
/// The key is single-use per lock cycle: a successful unlock clears the lock
/// flag AND rotates to a fresh key in the same store write.
async fn unlock_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UnlockRequest>,
) -> Result<Json<LockResponse>> {
    // Malformed keys are rejected before any store read.
    if payload.unlock_key.len() != UNLOCK_KEY_LEN {
        return Err(AppError::BadRequest(format!(
            "Unlock key must be exactly {} characters",
            UNLOCK_KEY_LEN
        )));
    }

    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    if !keys_match(&payload.unlock_key, &profile.unlock_key) {
        tracing::warn!(user_id = %user.user_id, "Unlock attempt with wrong key");
        return Err(AppError::Forbidden("Invalid unlock key".to_string()));
    }

    profile.account_locked = false;
    profile.unlock_key = generate_unlock_key()?;
    profile.updated_at = chrono::Utc::now().to_rfc3339();
    state.db.set_lock_state(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Account unlocked, key rotated");

    state.notifier.notify_later(
        &user.user_id,
        NotificationKind::UnlockKeyRotated,
        "Unlock key rotated",
        "Your account was unlocked and a new unlock key was issued. \
         Save the new key from your account settings.",
        None,
    );

    Ok(Json(LockResponse {
        message: "Account unlocked. A new unlock key has been issued.".to_string(),
        account_locked: false,
    }))
}

#[derive(Serialize)]
pub struct UnlockKeyResponse {
    pub unlock_key: String,
}

/// Return the current unlock key to its owner.
///
/// Plaintext by product design: the owner must copy it out-of-band. No
/// rotation happens on read, and the key is never logged.
async fn get_unlock_key(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UnlockKeyResponse>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(UnlockKeyResponse {
        unlock_key: profile.unlock_key,
    }))
}

// ─── Verification ────────────────────────────────────────────

/// Current email/phone verification state from the identity provider.
///
/// Served from a short-TTL cache; the frontend polls this while the user
/// completes an out-of-band challenge.
async fn verification_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<VerificationStatus>> {
    let status = state.identity.verification_status(&user.user_id).await?;
    Ok(Json(status))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Re-send the email verification challenge.
async fn send_email_verification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    state.identity.send_email_verification(&user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Verification email sent.".to_string(),
    }))
}

/// Send the SMS verification challenge.
async fn send_phone_verification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    state.identity.send_phone_verification(&user.user_id).await?;
    Ok(Json(MessageResponse {
        message: "Verification code sent to your phone.".to_string(),
    }))
}

// ─── Two-Factor Authentication ───────────────────────────────

/// Create a TOTP factor. It stays inactive until verified.
async fn create_two_factor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<TotpEnrollment>> {
    let enrollment = state.identity.create_totp(&user.user_id).await?;
    Ok(Json(enrollment))
}

#[derive(Deserialize, Validate)]
pub struct TwoFactorVerifyRequest {
    #[validate(length(min = 6, max = 8))]
    code: String,
}

/// Verify the TOTP factor and mirror the flag on the profile.
async fn verify_two_factor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<TwoFactorVerifyRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.identity.verify_totp(&user.user_id, &payload.code).await?;

    if let Some(mut profile) = state.db.get_profile(&user.user_id).await? {
        profile.two_factor_enabled = true;
        profile.updated_at = chrono::Utc::now().to_rfc3339();
        state.db.set_two_factor(&profile).await?;
    }

    Ok(Json(MessageResponse {
        message: "Two-factor authentication enabled.".to_string(),
    }))
}

/// Remove the TOTP factor and clear the profile flag.
async fn disable_two_factor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MessageResponse>> {
    state.identity.delete_totp(&user.user_id).await?;

    if let Some(mut profile) = state.db.get_profile(&user.user_id).await? {
        profile.two_factor_enabled = false;
        profile.updated_at = chrono::Utc::now().to_rfc3339();
        state.db.set_two_factor(&profile).await?;
    }

    Ok(Json(MessageResponse {
        message: "Two-factor authentication disabled.".to_string(),
    }))
}

// ─── Password ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    current_password: String,
    #[validate(length(min = 8, max = 128))]
    new_password: String,
}

/// Change the account password, re-verifying the current one upstream.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .identity
        .change_password(&user.user_id, &payload.current_password, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed.".to_string(),
    }))
}
