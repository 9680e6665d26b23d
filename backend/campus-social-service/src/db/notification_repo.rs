use crate::error::{AppError, Result};
use crate::models::{NewNotification, Notification, NotificationKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Insert notifications in one transaction; returns the number written
    async fn insert_notifications(&self, batch: &[NewNotification]) -> Result<u64>;

    /// Newest-first notifications for a recipient
    async fn list_for_recipient(&self, recipient_id: Uuid, limit: i64)
        -> Result<Vec<Notification>>;

    /// Mark every unread notification of a recipient as read
    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64>;
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: Uuid,
    actor_id: Uuid,
    kind: String,
    post_id: Option<Uuid>,
    comment_id: Option<Uuid>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self> {
        let kind: NotificationKind = row.kind.parse().map_err(AppError::Internal)?;
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            actor_id: row.actor_id,
            kind,
            post_id: row.post_id,
            comment_id: row.comment_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

/// Repository for Notification operations
#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationRepository {
    async fn insert_notifications(&self, batch: &[NewNotification]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for n in batch {
            let result = sqlx::query(
                r#"
                INSERT INTO notifications (recipient_id, actor_id, kind, post_id, comment_id)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(n.recipient_id)
            .bind(n.actor_id)
            .bind(n.kind.as_str())
            .bind(n.post_id)
            .bind(n.comment_id)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }
        tx.commit().await?;

        Ok(written)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, recipient_id, actor_id, kind, post_id, comment_id, is_read, created_at
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(recipient_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = TRUE
            WHERE recipient_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
