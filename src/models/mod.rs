// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod donation;
pub mod notification;
pub mod supporter;
pub mod trip;
pub mod user;

pub use donation::Donation;
pub use notification::{Notification, NotificationKind};
pub use supporter::{PrayerIntercessor, PrayerRequest, TripFollower};
pub use trip::Trip;
pub use user::{AccountCategory, UserProfile, VerificationStatus};
