// SPDX-License-Identifier: MIT

//! Verification and account-lock route guard.
//!
//! Applied on top of `require_auth` for everything behind the dashboard.
//! Gate order matters and is part of the contract:
//!
//! 1. unverified email -> `email_unverified` (verification-pending surface)
//! 2. no profile       -> `onboarding_required` (profile form)
//! 3. locked account   -> `account_locked` (emergency unlock surface)
//!
//! A locked session must never reach a trip/donation/settings handler; the
//! only authed operations left to it are unlock, verification status, and
//! sign-out, which are mounted outside this guard.

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware requiring a verified, onboarded, unlocked account.
pub async fn require_active(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(AppError::Unauthorized)?;

    let status = state.identity.verification_status(&user.user_id).await?;
    if !status.email_verified {
        return Err(AppError::EmailUnverified);
    }

    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or(AppError::OnboardingRequired)?;

    if profile.account_locked {
        tracing::debug!(user_id = %user.user_id, "Locked account blocked from protected route");
        return Err(AppError::AccountLocked);
    }

    Ok(next.run(request).await)
}
