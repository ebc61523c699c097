// SPDX-License-Identifier: MIT

//! Per-user notification model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    UnlockKeyRotated,
    AccountLocked,
    DonationReceived,
    General,
}

/// Ephemeral per-user notification.
///
/// Never hard-deleted; users dismiss by flipping `is_visible` off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Document ID
    pub id: String,
    /// Recipient's user ID (row owner)
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Related trip, when the notification concerns one
    pub trip_id: Option<String>,
    pub is_read: bool,
    /// Soft-hide flag; hidden notifications stay in storage
    pub is_visible: bool,
    pub created_at: String,
}
