// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - User profiles (one document per identity, keyed by user ID)
//! - Trips (fundraising campaigns)
//! - Donations (immutable ledger)
//! - Notifications (per-user, soft-hidden)
//! - Supporter join rows (followers, prayer intercessors)
//! - Prayer requests
//!
//! Every row carries a `created_by`/`user_id` owner reference; handlers check
//! ownership after reading and before writing.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Donation, Notification, PrayerIntercessor, PrayerRequest, Trip, TripFollower, UserProfile,
};
use firestore::errors::FirestoreError;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Length of generated document IDs.
const ROW_ID_LEN: usize = 20;
const ROW_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Cursor for paginating a user's trips (newest first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripQueryCursor {
    /// RFC 3339 creation timestamp of the last row on the previous page
    pub created_at: String,
    /// Trip ID of that row (tiebreaker for identical timestamps)
    pub trip_id: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Generate a random document ID.
    pub fn new_row_id() -> String {
        use ring::rand::{SecureRandom, SystemRandom};

        let rng = SystemRandom::new();
        let mut id = String::with_capacity(ROW_ID_LEN);
        let mut buf = [0u8; 64];
        let limit = (u8::MAX as usize + 1) - ((u8::MAX as usize + 1) % ROW_ID_ALPHABET.len());

        while id.len() < ROW_ID_LEN {
            if rng.fill(&mut buf).is_err() {
                // SystemRandom failure is unrecoverable; fall back to a
                // timestamp-derived suffix rather than panicking.
                id.push_str(&format!("{:x}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)));
                break;
            }
            for &byte in buf.iter() {
                if (byte as usize) < limit {
                    id.push(ROW_ID_ALPHABET[byte as usize % ROW_ID_ALPHABET.len()] as char);
                    if id.len() == ROW_ID_LEN {
                        break;
                    }
                }
            }
        }

        id
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get a profile by the owning identity's user ID.
    ///
    /// `None` is a normal state: the identity has not completed onboarding.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a profile document keyed by the owner's user ID.
    ///
    /// Uses an insert (create-if-absent), so concurrent first-time
    /// submissions race on the store's document uniqueness: the loser gets
    /// `AlreadyExists` instead of creating a duplicate.
    pub async fn create_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _created: UserProfile = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => AppError::AlreadyExists(
                    "A profile already exists for this account".to_string(),
                ),
                other => AppError::Database(other.to_string()),
            })?;
        Ok(())
    }

    /// Update the mutable profile fields only.
    ///
    /// Email and account category are immutable post-creation and are never
    /// written here; the unlock key and lock flag have their own operation.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(UserProfile::{
                display_name,
                phone,
                address,
                emergency_contact,
                is_501c3,
                tax_deductible,
                updated_at
            }))
            .in_col(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write the lock flag and unlock key together in a single update call.
    ///
    /// Lock and unlock both go through here so the flag and the key can never
    /// be observed out of sync.
    pub async fn set_lock_state(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(UserProfile::{
                account_locked,
                unlock_key,
                updated_at
            }))
            .in_col(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update the 2FA flag.
    pub async fn set_two_factor(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(UserProfile::{two_factor_enabled, updated_at}))
            .in_col(collections::USERS)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Trip Operations ─────────────────────────────────────────

    /// Store a new trip.
    pub async fn create_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRIPS)
            .document_id(&trip.id)
            .object(trip)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a trip by ID.
    pub async fn get_trip(&self, trip_id: &str) -> Result<Option<Trip>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRIPS)
            .obj()
            .one(trip_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a page of the owner's trips, newest first.
    ///
    /// Ordering is `(created_at desc, id desc)` and the cursor boundary is
    /// the matching compound condition, so rows sharing a timestamp are
    /// neither skipped nor repeated across page boundaries.
    pub async fn list_trips_for_owner(
        &self,
        owner_id: &str,
        cursor: Option<TripQueryCursor>,
        limit: u32,
    ) -> Result<Vec<Trip>, AppError> {
        let owner = owner_id.to_string();
        let query = self.get_client()?.fluent().select().from(collections::TRIPS);

        let query = if let Some(cursor) = cursor {
            let created_at = cursor.created_at;
            let trip_id = cursor.trip_id;
            query.filter(move |q| {
                q.for_all([
                    q.field("created_by").eq(owner.clone()),
                    q.for_any([
                        q.field("created_at").less_than(created_at.clone()),
                        q.for_all([
                            q.field("created_at").eq(created_at.clone()),
                            q.field("id").less_than(trip_id.clone()),
                        ]),
                    ]),
                ])
            })
        } else {
            query.filter(move |q| q.for_all([q.field("created_by").eq(owner.clone())]))
        };

        query
            .order_by([
                ("created_at", firestore::FirestoreQueryDirection::Descending),
                ("id", firestore::FirestoreQueryDirection::Descending),
            ])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all of an owner's trips (no pagination; used by background fan-out).
    pub async fn list_all_trips_for_owner(&self, owner_id: &str) -> Result<Vec<Trip>, AppError> {
        let owner = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRIPS)
            .filter(move |q| q.for_all([q.field("created_by").eq(owner.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite a trip document. Ownership is checked by the caller.
    pub async fn update_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRIPS)
            .document_id(&trip.id)
            .object(trip)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a trip and cascade to its dependent rows.
    ///
    /// Removes follower and intercessor join rows and notifications that
    /// reference the trip, in batched transactions. Donation rows are an
    /// immutable financial ledger and are retained.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_trip_cascade(&self, trip_id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        // 1. Follower join rows
        let followers = self.list_followers_for_trip(trip_id).await?;
        let count = followers.len();
        self.batch_delete(&followers, collections::TRIP_FOLLOWERS, |f: &TripFollower| {
            format!("{}_{}", f.trip_id, f.user_id)
        })
        .await?;
        deleted_count += count;
        tracing::debug!(trip_id, count, "Deleted trip follower rows");

        // 2. Intercessor join rows
        let intercessors = self.list_intercessors_for_trip(trip_id).await?;
        let count = intercessors.len();
        self.batch_delete(
            &intercessors,
            collections::PRAYER_INTERCESSORS,
            |i: &PrayerIntercessor| format!("{}_{}", i.trip_id, i.user_id),
        )
        .await?;
        deleted_count += count;
        tracing::debug!(trip_id, count, "Deleted intercessor rows");

        // 3. Notifications referencing the trip
        let trip_key = trip_id.to_string();
        let notifications: Vec<Notification> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| q.for_all([q.field("trip_id").eq(trip_key.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = notifications.len();
        self.batch_delete(
            &notifications,
            collections::NOTIFICATIONS,
            |n: &Notification| n.id.clone(),
        )
        .await?;
        deleted_count += count;
        tracing::debug!(trip_id, count, "Deleted trip notifications");

        // 4. The trip document itself
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TRIPS)
            .document_id(trip_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;

        tracing::info!(trip_id, deleted_count, "Trip deletion complete");

        Ok(deleted_count)
    }

    // ─── Donation Operations ─────────────────────────────────────

    /// Atomically record a donation: write the ledger row and bump the trip's
    /// raised total in one transaction.
    ///
    /// The trip read carries the transaction's consistency selector, so the
    /// commit is conflict-checked against it: if another donation bumps the
    /// total first, this commit aborts instead of silently losing the
    /// increment.
    pub async fn record_donation_atomic(&self, donation: &Donation) -> Result<(), AppError> {
        let donation = donation.clone();

        let mut transaction = self
            .get_client()?
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // The read must be registered with the transaction for conflict
        // detection; a plain select would not be.
        let tx_db = self.get_client()?.clone_with_consistency_selector(
            firestore::FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ),
        );

        let trip: Option<Trip> = tx_db
            .fluent()
            .select()
            .by_id_in(collections::TRIPS)
            .obj()
            .one(&donation.trip_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read trip in transaction: {}", e)))?;

        let mut trip = match trip {
            Some(trip) => trip,
            None => {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound(format!(
                    "Trip {} not found",
                    donation.trip_id
                )));
            }
        };

        if !trip.is_active {
            let _ = transaction.rollback().await;
            return Err(AppError::BadRequest(
                "Trip is not accepting donations".to_string(),
            ));
        }

        trip.raised_amount = crate::services::fees::round2(trip.raised_amount + donation.amount);
        trip.updated_at = chrono::Utc::now().to_rfc3339();

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::DONATIONS)
            .document_id(&donation.id)
            .object(&donation)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add donation to transaction: {}", e))
            })?;

        self.get_client()?
            .fluent()
            .update()
            .in_col(collections::TRIPS)
            .document_id(&trip.id)
            .object(&trip)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add trip to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            donation_id = %donation.id,
            trip_id = %donation.trip_id,
            amount = donation.amount,
            "Donation recorded atomically"
        );

        Ok(())
    }

    /// Get a donation by ID.
    pub async fn get_donation(&self, donation_id: &str) -> Result<Option<Donation>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DONATIONS)
            .obj()
            .one(donation_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All donations for a trip, newest first.
    pub async fn list_donations_for_trip(&self, trip_id: &str) -> Result<Vec<Donation>, AppError> {
        let trip_key = trip_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DONATIONS)
            .filter(move |q| q.for_all([q.field("trip_id").eq(trip_key.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A donor's giving history, newest first.
    pub async fn list_donations_for_donor(&self, donor_id: &str) -> Result<Vec<Donation>, AppError> {
        let donor = donor_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DONATIONS)
            .filter(move |q| q.for_all([q.field("created_by").eq(donor.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Flip the one mutable flag on a donation row.
    pub async fn mark_receipt_sent(&self, donation: &Donation) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(Donation::{receipt_sent}))
            .in_col(collections::DONATIONS)
            .document_id(&donation.id)
            .object(donation)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Notification Operations ─────────────────────────────────

    /// Store a notification.
    pub async fn create_notification(&self, notification: &Notification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a notification by ID.
    pub async fn get_notification(
        &self,
        notification_id: &str,
    ) -> Result<Option<Notification>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::NOTIFICATIONS)
            .obj()
            .one(notification_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Visible notifications for a user, newest first.
    pub async fn list_notifications_for_user(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<Notification>, AppError> {
        let user = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::NOTIFICATIONS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user.clone()),
                    q.field("is_visible").eq(true),
                ])
            })
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark a notification read.
    pub async fn set_notification_read(&self, notification: &Notification) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(Notification::{is_read}))
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Soft-hide a notification (no hard delete).
    pub async fn set_notification_hidden(
        &self,
        notification: &Notification,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(Notification::{is_visible}))
            .in_col(collections::NOTIFICATIONS)
            .document_id(&notification.id)
            .object(notification)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Supporter Join Operations ───────────────────────────────

    /// Add a follower join row. Document ID `{trip_id}_{user_id}` makes
    /// repeat invitation acceptance idempotent.
    pub async fn add_follower(&self, follower: &TripFollower) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", follower.trip_id, follower.user_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRIP_FOLLOWERS)
            .document_id(&doc_id)
            .object(follower)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a follower join row.
    pub async fn remove_follower(&self, trip_id: &str, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::TRIP_FOLLOWERS)
            .document_id(format!("{}_{}", trip_id, user_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All followers of a trip.
    pub async fn list_followers_for_trip(
        &self,
        trip_id: &str,
    ) -> Result<Vec<TripFollower>, AppError> {
        let trip_key = trip_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::TRIP_FOLLOWERS)
            .filter(move |q| q.for_all([q.field("trip_id").eq(trip_key.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Add an intercessor join row (same ID scheme as followers).
    pub async fn add_intercessor(&self, intercessor: &PrayerIntercessor) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", intercessor.trip_id, intercessor.user_id);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PRAYER_INTERCESSORS)
            .document_id(&doc_id)
            .object(intercessor)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove an intercessor join row.
    pub async fn remove_intercessor(&self, trip_id: &str, user_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::PRAYER_INTERCESSORS)
            .document_id(format!("{}_{}", trip_id, user_id))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All intercessors of a trip.
    pub async fn list_intercessors_for_trip(
        &self,
        trip_id: &str,
    ) -> Result<Vec<PrayerIntercessor>, AppError> {
        let trip_key = trip_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PRAYER_INTERCESSORS)
            .filter(move |q| q.for_all([q.field("trip_id").eq(trip_key.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Prayer Request Operations ───────────────────────────────

    /// Store a new prayer request.
    pub async fn create_prayer_request(&self, request: &PrayerRequest) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PRAYER_REQUESTS)
            .document_id(&request.id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get a prayer request by ID.
    pub async fn get_prayer_request(
        &self,
        request_id: &str,
    ) -> Result<Option<PrayerRequest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PRAYER_REQUESTS)
            .obj()
            .one(request_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// An owner's prayer requests, newest first.
    pub async fn list_prayer_requests_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<PrayerRequest>, AppError> {
        let owner = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PRAYER_REQUESTS)
            .filter(move |q| q.for_all([q.field("created_by").eq(owner.clone())]))
            .order_by([("created_at", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update the mutable fields of a prayer request.
    pub async fn update_prayer_request(&self, request: &PrayerRequest) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(PrayerRequest::{title, body, is_answered, updated_at}))
            .in_col(collections::PRAYER_REQUESTS)
            .document_id(&request.id)
            .object(request)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ──────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
