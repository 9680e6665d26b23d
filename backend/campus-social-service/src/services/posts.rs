/// Post service - handles post creation, retrieval, and deletion
use crate::db::Stores;
use crate::error::{AppError, Result};
use crate::middleware::check_post_deletion;
use crate::models::{AuthorSummary, NewPost, PostView};
use uuid::Uuid;

pub struct PostService {
    stores: Stores,
}

impl PostService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Create a new post
    pub async fn create_post(
        &self,
        author_id: Uuid,
        content: &str,
        image_url: Option<String>,
        is_anonymous: bool,
    ) -> Result<PostView> {
        let content = content.trim();
        if content.is_empty() && image_url.is_none() {
            return Err(AppError::Validation(
                "Post needs content or an image".to_string(),
            ));
        }

        let post = self
            .stores
            .posts
            .insert_post(NewPost {
                author_id,
                content: content.to_string(),
                image_url,
                is_anonymous,
            })
            .await?;

        tracing::info!(post_id = %post.id, %author_id, is_anonymous, "post created");

        let author = self.author_of(author_id).await?;
        Ok(PostView::sanitize(&post, author, Some(author_id)))
    }

    /// Get a sanitized post by ID
    pub async fn get_post(&self, post_id: Uuid, viewer: Uuid) -> Result<PostView> {
        let post = self
            .stores
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        // Skip the author lookup entirely for anonymous posts
        let author = if post.is_anonymous {
            None
        } else {
            self.author_of(post.author_id).await?
        };

        Ok(PostView::sanitize(&post, author, Some(viewer)))
    }

    /// Delete a post; only its author may do so
    pub async fn delete_post(&self, post_id: Uuid, actor: Uuid) -> Result<()> {
        let post = self
            .stores
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        check_post_deletion(actor, &post)?;

        if !self.stores.posts.delete_post(post_id).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        tracing::info!(%post_id, %actor, "post deleted");
        Ok(())
    }

    async fn author_of(&self, user_id: Uuid) -> Result<Option<AuthorSummary>> {
        Ok(self
            .stores
            .users
            .get_user(user_id)
            .await?
            .as_ref()
            .map(AuthorSummary::from))
    }
}
