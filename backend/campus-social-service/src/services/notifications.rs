/// Notification service - fan-out of activity notifications and inbox reads
use crate::db::NotificationStore;
use crate::error::Result;
use crate::models::{NewNotification, Notification};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_NOTIFICATION_LIMIT: i64 = 20;
pub const MAX_NOTIFICATION_LIMIT: i64 = 100;

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Write notifications as a side effect of another operation.
    ///
    /// Self-notifications are removed and each recipient is notified at most once
    /// (first entry wins). Failures are logged and swallowed: the originating
    /// operation has already succeeded.
    pub async fn notify(&self, batch: Vec<NewNotification>) {
        let batch = dedupe_recipients(batch);
        if batch.is_empty() {
            return;
        }

        match self.store.insert_notifications(&batch).await {
            Ok(written) => tracing::debug!(written, "notifications written"),
            Err(err) => tracing::warn!(error = %err, "failed to write notifications"),
        }
    }

    /// Newest-first notifications for `recipient_id`
    pub async fn list(&self, recipient_id: Uuid, limit: Option<i64>) -> Result<Vec<Notification>> {
        let limit = limit
            .unwrap_or(DEFAULT_NOTIFICATION_LIMIT)
            .clamp(1, MAX_NOTIFICATION_LIMIT);
        self.store.list_for_recipient(recipient_id, limit).await
    }

    /// Mark all of `recipient_id`'s notifications read
    pub async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        self.store.mark_all_read(recipient_id).await
    }
}

/// Drop self-notifications and repeated recipients, keeping the first entry.
pub fn dedupe_recipients(batch: Vec<NewNotification>) -> Vec<NewNotification> {
    let mut seen = HashSet::new();
    batch
        .into_iter()
        .filter(|n| n.recipient_id != n.actor_id)
        .filter(|n| seen.insert(n.recipient_id))
        .collect()
}
