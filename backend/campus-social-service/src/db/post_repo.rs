use crate::error::Result;
use crate::models::{NewPost, Post};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Post persistence. The `likes` set is only mutated through
/// [`MembershipStore`](super::MembershipStore).
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a new post
    async fn insert_post(&self, new: NewPost) -> Result<Post>;

    /// Get a post by ID
    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>>;

    /// Delete a post and (by cascade) its comments; true if a row was removed
    async fn delete_post(&self, post_id: Uuid) -> Result<bool>;
}

/// Repository for Post operations
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostRepository {
    async fn insert_post(&self, new: NewPost) -> Result<Post> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (author_id, content, image_url, is_anonymous)
            VALUES ($1, $2, $3, $4)
            RETURNING id, author_id, content, image_url, is_anonymous, likes, created_at
            "#,
        )
        .bind(new.author_id)
        .bind(new.content)
        .bind(new.image_url)
        .bind(new.is_anonymous)
        .fetch_one(&self.pool)
        .await?;

        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, content, image_url, is_anonymous, likes, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
