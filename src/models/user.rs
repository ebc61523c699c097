//! User profile model for storage and API.

use serde::{Deserialize, Serialize};

/// What kind of account a profile represents.
///
/// Immutable after profile creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountCategory {
    Missionary,
    Organization,
    Follower,
    Intercessor,
}

/// User profile stored in Firestore.
///
/// The document ID is the owning identity's user ID, so the store's own
/// document uniqueness enforces "at most one profile per identity" even under
/// concurrent first-time submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning identity's user ID (also the document ID)
    pub user_id: String,
    pub category: AccountCategory,
    /// Display name (trimmed, 2-100 chars)
    pub display_name: String,
    /// Lower-cased email; immutable after creation
    pub email: String,
    /// Normalized phone: `+` followed by digits only
    pub phone: String,
    pub address: Option<String>,
    /// Free-text emergency contact info
    pub emergency_contact: Option<String>,
    /// Registered 501(c)(3) non-profit
    pub is_501c3: bool,
    /// Donations are tax deductible
    pub tax_deductible: bool,
    /// External payment-account reference (processor-side ID)
    pub payment_account_id: Option<String>,
    /// Emergency unlock key: 255 chars, plaintext by product design
    /// (the owner must be able to read it back out-of-band)
    pub unlock_key: String,
    pub account_locked: bool,
    pub two_factor_enabled: bool,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
}

/// Email/phone verification state, read through from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationStatus {
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Whether a phone number is on file with the identity provider
    pub has_phone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
