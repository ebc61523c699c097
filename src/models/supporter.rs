// SPDX-License-Identifier: MIT

//! Supporter join rows and prayer requests.

use serde::{Deserialize, Serialize};

/// Join row linking a trip to a following supporter.
///
/// Document ID is `{trip_id}_{user_id}`, so accepting the same invitation
/// twice overwrites rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripFollower {
    pub trip_id: String,
    /// Follower's user ID
    pub user_id: String,
    pub created_at: String,
}

/// Join row linking a trip to a prayer intercessor.
///
/// Same document ID scheme as [`TripFollower`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerIntercessor {
    pub trip_id: String,
    pub user_id: String,
    pub created_at: String,
}

/// A prayer request posted by a profile, optionally tied to a trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerRequest {
    /// Document ID
    pub id: String,
    /// Owning profile's user ID
    pub created_by: String,
    pub trip_id: Option<String>,
    pub title: String,
    pub body: String,
    pub is_answered: bool,
    pub created_at: String,
    pub updated_at: String,
}
