// SPDX-License-Identifier: MIT

//! Notification routes.
//!
//! Notifications are created server-side; users can only read, mark read,
//! and soft-hide their own.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::Notification;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_LIMIT: u32 = 50;
const MAX_LIMIT: u32 = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notifications", get(list_notifications))
        .route("/api/notifications/{id}/read", post(mark_read))
        .route("/api/notifications/{id}/hide", post(hide))
}

#[derive(Deserialize)]
struct NotificationsQuery {
    limit: Option<u32>,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// Visible notifications for the caller, newest first.
async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<NotificationsQuery>,
) -> Result<Json<NotificationsResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT).max(1);
    let notifications = state
        .db
        .list_notifications_for_user(&user.user_id, limit)
        .await?;
    Ok(Json(NotificationsResponse { notifications }))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Mark one of the caller's notifications as read.
async fn mark_read(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let mut notification = load_owned(&state, &notification_id, &user.user_id).await?;

    notification.is_read = true;
    state.db.set_notification_read(&notification).await?;

    Ok(Json(MessageResponse {
        message: "Notification marked read.".to_string(),
    }))
}

/// Soft-hide one of the caller's notifications. No hard delete exists.
async fn hide(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(notification_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let mut notification = load_owned(&state, &notification_id, &user.user_id).await?;

    notification.is_visible = false;
    state.db.set_notification_hidden(&notification).await?;

    Ok(Json(MessageResponse {
        message: "Notification hidden.".to_string(),
    }))
}

async fn load_owned(
    state: &Arc<AppState>,
    notification_id: &str,
    user_id: &str,
) -> Result<Notification> {
    let notification = state
        .db
        .get_notification(notification_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    if notification.user_id != user_id {
        return Err(AppError::Forbidden(
            "You do not own this notification".to_string(),
        ));
    }

    Ok(notification)
}
