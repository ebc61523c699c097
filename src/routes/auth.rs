// SPDX-License-Identifier: MIT

//! Sign-up, login, and logout.
//!
//! The identity provider owns credentials; this service mints its own session
//! JWT once the provider vouches for them.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::services::notify::fire_and_forget;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
}

#[derive(Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 128))]
    password: String,
    #[validate(length(min = 2, max = 100))]
    name: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub message: String,
}

/// Create an account with the identity provider and start a session.
///
/// The verification email is a best-effort side effect: a provider hiccup
/// must not fail the signup, the user can re-request it from the
/// verification-pending surface.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    let user_id = state
        .identity
        .create_account(&email, &payload.password, &name)
        .await?;

    tracing::info!(user_id = %user_id, "Account created");

    let identity = state.identity.clone();
    let verification_user = user_id.clone();
    fire_and_forget("signup_verification_email", async move {
        identity.send_email_verification(&verification_user).await
    });

    let jwt = create_jwt(&user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok((
        jar.add(session_cookie(&state, jwt)),
        Json(SessionResponse {
            user_id,
            message: "Account created. Check your email to verify your address.".to_string(),
        }),
    ))
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    email: String,
    #[validate(length(min = 1))]
    password: String,
}

/// Verify credentials with the identity provider and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let email = payload.email.trim().to_lowercase();
    let user_id = state
        .identity
        .verify_credentials(&email, &payload.password)
        .await?;

    tracing::info!(user_id = %user_id, "Login successful");

    let jwt = create_jwt(&user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok((
        jar.add(session_cookie(&state, jwt)),
        Json(SessionResponse {
            user_id,
            message: "Signed in.".to_string(),
        }),
    ))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Clear the session cookie.
///
/// Always available, including to locked accounts: sign-out is one of the two
/// operations a locked session keeps.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (
        jar.remove(removal),
        Json(LogoutResponse {
            message: "Signed out.".to_string(),
        }),
    )
}

fn session_cookie(state: &Arc<AppState>, jwt: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, jwt))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!state.config.frontend_url.starts_with("http://"))
        .max_age(time::Duration::days(30))
        .build()
}
