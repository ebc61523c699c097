//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{FirestoreDb, TripQueryCursor};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TRIPS: &str = "trips";
    pub const DONATIONS: &str = "donations";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const TRIP_FOLLOWERS: &str = "trip_followers";
    pub const PRAYER_INTERCESSORS: &str = "prayer_intercessors";
    pub const PRAYER_REQUESTS: &str = "prayer_requests";
}
