// SPDX-License-Identifier: MIT

//! MissionSend API: backend for the MissionSend donor/fundraising platform.
//!
//! This crate provides the HTTP API for profiles, the emergency account-lock
//! subsystem, verification gating, trips, donations, prayer requests,
//! supporters, and notifications, over Firestore and an external identity
//! provider.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod phone;
pub mod routes;
pub mod services;

use config::Config;
use db::FirestoreDb;
use services::{IdentityService, Notifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: Arc<IdentityService>,
    pub notifier: Notifier,
}
