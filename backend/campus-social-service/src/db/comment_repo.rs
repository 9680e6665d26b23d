use crate::error::Result;
use crate::models::{Comment, NewComment};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Comment persistence. Comments are insert-only; deletion happens by cascade
/// when the owning post is removed.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Insert a new comment
    async fn insert_comment(&self, new: NewComment) -> Result<Comment>;

    /// Get a single comment by ID
    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>>;

    /// All comments of the given posts, ordered by creation time ascending
    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>>;
}

/// Repository for Comment operations
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentStore for PgCommentRepository {
    async fn insert_comment(&self, new: NewComment) -> Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (post_id, user_id, content, parent_comment_id, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, post_id, user_id, content, parent_comment_id, image_url, created_at
            "#,
        )
        .bind(new.post_id)
        .bind(new.user_id)
        .bind(new.content)
        .bind(new.parent_comment_id)
        .bind(new.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_comment_id, image_url, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments = sqlx::query_as::<_, Comment>(
            r#"
            SELECT id, post_id, user_id, content, parent_comment_id, image_url, created_at
            FROM comments
            WHERE post_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }
}
