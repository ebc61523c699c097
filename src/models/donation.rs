// SPDX-License-Identifier: MIT

//! Donation ledger model.

use serde::{Deserialize, Serialize};

/// An immutable donation ledger entry.
///
/// Written once by the donation flow; the only field ever updated afterwards
/// is `receipt_sent`. Ledger rows outlive the trip they reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    /// Document ID
    pub id: String,
    pub trip_id: String,
    /// Donor's user ID (row owner)
    pub created_by: String,
    /// Gross amount given by the donor
    pub amount: f64,
    /// Payment-processing fee, computed server-side at creation
    pub processing_fee: f64,
    /// Total charged to the donor: amount + processing_fee
    pub total_charged: f64,
    pub receipt_sent: bool,
    pub created_at: String,
}
