// SPDX-License-Identifier: MIT

//! Fundraising trip model.

use serde::{Deserialize, Serialize};

/// A fundraising campaign owned by a profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Document ID
    pub id: String,
    /// Owning profile's user ID
    pub created_by: String,
    pub name: String,
    pub description: String,
    /// Fundraising goal in currency units
    pub goal_amount: f64,
    /// Running total of gross donations received
    pub raised_amount: f64,
    /// Active trips appear publicly and can receive donations
    pub is_active: bool,
    /// Destination is a restricted country; location details are withheld
    /// from public surfaces
    pub restricted_country: bool,
    /// Trip date range (RFC 3339)
    pub start_date: String,
    pub end_date: String,
    /// File-storage references for cover photos etc.
    #[serde(default)]
    pub media_file_ids: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}
