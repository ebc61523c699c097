// SPDX-License-Identifier: MIT

//! Best-effort side effects.
//!
//! Lock/unlock, signup, and donation flows emit notifications and
//! verification emails that must never fail or delay the primary operation.
//! Everything here runs on a detached task; failures are logged and dropped.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::{Notification, NotificationKind};
use futures_util::{stream, StreamExt};
use std::future::Future;

/// Concurrency limit for fan-out notification writes.
const MAX_CONCURRENT_NOTIFY_OPS: usize = 20;

/// Run a best-effort side effect on a detached task.
///
/// The primary operation's outcome and latency are independent of `fut`;
/// a failure is logged at `warn` and otherwise ignored.
pub fn fire_and_forget<F>(label: &'static str, fut: F)
where
    F: Future<Output = Result<(), AppError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(side_effect = label, error = %e, "Best-effort side effect failed");
        }
    });
}

/// Notification writer for best-effort fan-out.
#[derive(Clone)]
pub struct Notifier {
    db: FirestoreDb,
}

impl Notifier {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Insert a notification for one user in the background.
    pub fn notify_later(
        &self,
        user_id: &str,
        kind: NotificationKind,
        title: &str,
        body: &str,
        trip_id: Option<String>,
    ) {
        let db = self.db.clone();
        let notification = Notification {
            id: FirestoreDb::new_row_id(),
            user_id: user_id.to_string(),
            kind,
            title: title.to_string(),
            body: body.to_string(),
            trip_id,
            is_read: false,
            is_visible: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        fire_and_forget("notification_insert", async move {
            db.create_notification(&notification).await
        });
    }

    /// Notify every follower of the owner's trips that updates are paused.
    ///
    /// Used when an account is emergency-locked. Runs entirely in the
    /// background: the lock itself has already been committed.
    pub fn notify_followers_of_lock(&self, owner_id: &str) {
        let db = self.db.clone();
        let owner_id = owner_id.to_string();

        fire_and_forget("lock_follower_fanout", async move {
            let trips = db.list_all_trips_for_owner(&owner_id).await?;
            let now = chrono::Utc::now().to_rfc3339();

            let mut notifications = Vec::new();
            for trip in &trips {
                let followers = db.list_followers_for_trip(&trip.id).await?;
                for follower in followers {
                    notifications.push(Notification {
                        id: FirestoreDb::new_row_id(),
                        user_id: follower.user_id,
                        kind: NotificationKind::AccountLocked,
                        title: "Trip updates paused".to_string(),
                        body: format!("Updates for \"{}\" are paused for now.", trip.name),
                        trip_id: Some(trip.id.clone()),
                        is_read: false,
                        is_visible: true,
                        created_at: now.clone(),
                    });
                }
            }

            let count = notifications.len();
            stream::iter(notifications)
                .map(|notification| {
                    let db = db.clone();
                    async move { db.create_notification(&notification).await }
                })
                .buffer_unordered(MAX_CONCURRENT_NOTIFY_OPS)
                .collect::<Vec<Result<(), AppError>>>()
                .await
                .into_iter()
                .collect::<Result<Vec<()>, AppError>>()?;

            tracing::debug!(count, "Lock fan-out notifications written");
            Ok(())
        });
    }
}
