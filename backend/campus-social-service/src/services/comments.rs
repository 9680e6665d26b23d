/// Comment service - comment creation and comment tree retrieval
use crate::config::SocialConfig;
use crate::db::Stores;
use crate::error::{AppError, Result};
use crate::ids::parse_id_list;
use crate::metrics::{COMMENT_TREE_BUILD_SECONDS, COMMENT_TREE_NODES_TOTAL};
use crate::models::{
    AuthorSummary, Comment, CommentNode, NewComment, NewNotification, NotificationKind,
};
use crate::services::comment_tree::{distinct_author_ids, CommentForest, CommentTreeBuilder};
use crate::services::mentions::extract_mentions;
use crate::services::notifications::NotificationService;
use std::collections::HashMap;
use uuid::Uuid;

/// Validated input for a new comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    pub content: String,
    pub parent_comment_id: Option<Uuid>,
    pub image_url: Option<String>,
}

pub struct CommentService {
    stores: Stores,
    builder: CommentTreeBuilder,
    max_comment_length: usize,
}

impl CommentService {
    pub fn new(stores: Stores, social: &SocialConfig) -> Self {
        Self {
            stores,
            builder: CommentTreeBuilder::new(social.orphan_policy),
            max_comment_length: social.max_comment_length,
        }
    }

    /// Validate a raw (possibly comma-separated) id list, then fetch its forests.
    ///
    /// Any malformed id fails the whole call before the store is touched.
    pub async fn fetch_comment_trees_raw(&self, raw: &str) -> Result<(Vec<Uuid>, CommentForest)> {
        let post_ids = parse_id_list(raw)?;
        let forest = self.fetch_comment_trees(&post_ids).await?;
        Ok((post_ids, forest))
    }

    /// Comment forests for already-validated post ids.
    ///
    /// One store query for all comments, one bulk lookup for their authors.
    pub async fn fetch_comment_trees(&self, post_ids: &[Uuid]) -> Result<CommentForest> {
        let comments = self.stores.comments.comments_for_posts(post_ids).await?;
        let authors = self.author_summaries(&comments).await?;

        let timer = COMMENT_TREE_BUILD_SECONDS.start_timer();
        let forest = self.builder.build(post_ids, comments, &authors);
        timer.observe_duration();

        let nodes: usize = forest
            .values()
            .flat_map(|roots| roots.iter().map(CommentNode::subtree_len))
            .sum();
        COMMENT_TREE_NODES_TOTAL.inc_by(nodes as u64);

        tracing::debug!(posts = post_ids.len(), nodes, "comment forest built");
        Ok(forest)
    }

    async fn author_summaries(&self, comments: &[Comment]) -> Result<HashMap<Uuid, AuthorSummary>> {
        let author_ids = distinct_author_ids(comments);
        let users = self.stores.users.get_users_by_ids(&author_ids).await?;
        Ok(users
            .iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect())
    }

    /// Create a comment on `post_id` authored by `actor`.
    pub async fn create_comment(
        &self,
        actor: Uuid,
        post_id: Uuid,
        input: CreateCommentInput,
    ) -> Result<Comment> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment content cannot be empty".to_string(),
            ));
        }
        if content.chars().count() > self.max_comment_length {
            return Err(AppError::Validation(format!(
                "Comment exceeds {} characters",
                self.max_comment_length
            )));
        }

        let post = self
            .stores
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

        let parent = match input.parent_comment_id {
            Some(parent_id) => {
                let parent = self
                    .stores
                    .comments
                    .get_comment(parent_id)
                    .await?
                    .ok_or_else(|| AppError::Validation("Parent comment not found".to_string()))?;
                if parent.post_id != post_id {
                    return Err(AppError::Validation(
                        "Parent comment belongs to a different post".to_string(),
                    ));
                }
                Some(parent)
            }
            None => None,
        };

        let comment = self
            .stores
            .comments
            .insert_comment(NewComment {
                post_id,
                user_id: actor,
                content,
                parent_comment_id: input.parent_comment_id,
                image_url: input.image_url,
            })
            .await?;

        tracing::info!(%post_id, comment_id = %comment.id, user_id = %actor, "comment created");

        let mut batch = Vec::new();
        if let Some(parent) = &parent {
            batch.push(NewNotification {
                recipient_id: parent.user_id,
                actor_id: actor,
                kind: NotificationKind::Reply,
                post_id: Some(post_id),
                comment_id: Some(comment.id),
            });
        }
        batch.push(NewNotification {
            recipient_id: post.author_id,
            actor_id: actor,
            kind: NotificationKind::Comment,
            post_id: Some(post_id),
            comment_id: Some(comment.id),
        });
        batch.extend(self.mention_notifications(actor, &comment).await);

        NotificationService::new(self.stores.notifications.clone())
            .notify(batch)
            .await;

        Ok(comment)
    }

    async fn mention_notifications(&self, actor: Uuid, comment: &Comment) -> Vec<NewNotification> {
        let usernames = extract_mentions(&comment.content);
        if usernames.is_empty() {
            return Vec::new();
        }

        match self.stores.users.find_by_usernames(&usernames).await {
            Ok(users) => users
                .into_iter()
                .map(|user| NewNotification {
                    recipient_id: user.id,
                    actor_id: actor,
                    kind: NotificationKind::Mention,
                    post_id: Some(comment.post_id),
                    comment_id: Some(comment.id),
                })
                .collect(),
            Err(err) => {
                tracing::warn!(comment_id = %comment.id, error = %err, "mention lookup failed");
                Vec::new()
            }
        }
    }
}
