//! Like and follow toggles over set-valued fields.
//!
//! Each write is a single atomic add-to-set or pull, and the reported state is the
//! set returned by that write. The membership check that picks the direction is a
//! separate read, so two concurrent toggles of the same pair may both choose the
//! same direction. Sets never end up with duplicates or partial removals, but
//! toggle ordering under races is not linearizable.

use crate::config::SocialConfig;
use crate::db::{SetField, Stores};
use crate::error::{AppError, Result};
use crate::metrics::record_toggle;
use crate::models::{NewNotification, NotificationKind};
use crate::services::notifications::NotificationService;
use serde::Serialize;
use uuid::Uuid;

/// Rules applied before any follow-graph mutation
#[derive(Debug, Clone, Default)]
pub struct SocialPolicy {
    pub protected_account_id: Option<Uuid>,
}

impl SocialPolicy {
    pub fn from_config(social: &SocialConfig) -> Self {
        Self {
            protected_account_id: social.protected_account_id,
        }
    }

    pub fn is_protected(&self, user_id: Uuid) -> bool {
        self.protected_account_id == Some(user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub is_liked: bool,
    pub likes_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowToggle {
    pub is_following: bool,
    pub followers_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn outcome(&self) -> &'static str {
        match self {
            Direction::Add => "added",
            Direction::Remove => "removed",
        }
    }
}

fn not_found(field: SetField) -> AppError {
    AppError::NotFound(format!("{} not found", field.owner_kind()))
}

pub struct SocialGraphService {
    stores: Stores,
    policy: SocialPolicy,
}

impl SocialGraphService {
    pub fn new(stores: Stores, policy: SocialPolicy) -> Self {
        Self { stores, policy }
    }

    /// Like the post if `actor` has not liked it yet, otherwise unlike it.
    pub async fn toggle_like(&self, actor: Uuid, post_id: Uuid) -> Result<LikeToggle> {
        let likes = self
            .stores
            .sets
            .members(SetField::PostLikes, post_id)
            .await?
            .ok_or_else(|| {
                record_toggle("like", "not_found");
                not_found(SetField::PostLikes)
            })?;

        let direction = if likes.contains(&actor) {
            Direction::Remove
        } else {
            Direction::Add
        };

        let likes = self
            .write(direction, SetField::PostLikes, post_id, actor)
            .await?
            .ok_or_else(|| not_found(SetField::PostLikes))?;

        record_toggle("like", direction.outcome());
        tracing::info!(%post_id, %actor, outcome = direction.outcome(), likes = likes.len(), "like toggled");

        if direction == Direction::Add {
            self.notify_like(actor, post_id).await;
        }

        Ok(LikeToggle {
            is_liked: likes.contains(&actor),
            likes_count: likes.len(),
        })
    }

    /// Follow `target` if `actor` does not follow it yet, otherwise unfollow.
    pub async fn toggle_follow(&self, actor: Uuid, target: Uuid) -> Result<FollowToggle> {
        self.reject_self_follow(actor, target)?;

        let followers = self.load_followers(target).await?;
        let direction = if followers.contains(&actor) {
            Direction::Remove
        } else {
            Direction::Add
        };

        if direction == Direction::Remove {
            self.reject_protected(target)?;
        }

        self.apply_follow(actor, target, direction, direction == Direction::Add)
            .await
    }

    /// Idempotent follow
    pub async fn follow(&self, actor: Uuid, target: Uuid) -> Result<FollowToggle> {
        self.reject_self_follow(actor, target)?;

        let followers = self.load_followers(target).await?;
        let is_new = !followers.contains(&actor);

        self.apply_follow(actor, target, Direction::Add, is_new).await
    }

    /// Idempotent unfollow. The protected account can never be unfollowed,
    /// whatever the current state.
    pub async fn unfollow(&self, actor: Uuid, target: Uuid) -> Result<FollowToggle> {
        self.reject_self_follow(actor, target)?;
        self.reject_protected(target)?;

        self.load_followers(target).await?;
        self.apply_follow(actor, target, Direction::Remove, false)
            .await
    }

    fn reject_self_follow(&self, actor: Uuid, target: Uuid) -> Result<()> {
        if actor == target {
            record_toggle("follow", "rejected");
            return Err(AppError::Forbidden("You cannot follow yourself".to_string()));
        }
        Ok(())
    }

    fn reject_protected(&self, target: Uuid) -> Result<()> {
        if self.policy.is_protected(target) {
            record_toggle("follow", "rejected");
            return Err(AppError::ProtectedAccount(
                "This account cannot be unfollowed".to_string(),
            ));
        }
        Ok(())
    }

    async fn load_followers(&self, target: Uuid) -> Result<Vec<Uuid>> {
        self.stores
            .sets
            .members(SetField::UserFollowers, target)
            .await?
            .ok_or_else(|| {
                record_toggle("follow", "not_found");
                not_found(SetField::UserFollowers)
            })
    }

    async fn apply_follow(
        &self,
        actor: Uuid,
        target: Uuid,
        direction: Direction,
        notify: bool,
    ) -> Result<FollowToggle> {
        let followers = self
            .write(direction, SetField::UserFollowers, target, actor)
            .await?
            .ok_or_else(|| not_found(SetField::UserFollowers))?;

        if self
            .write(direction, SetField::UserFollowing, actor, target)
            .await?
            .is_none()
        {
            tracing::warn!(%actor, %target, "acting account missing during follow update");
            return Err(AppError::Unauthorized(
                "Acting account no longer exists".to_string(),
            ));
        }

        record_toggle("follow", direction.outcome());
        tracing::info!(%actor, %target, outcome = direction.outcome(), followers = followers.len(), "follow updated");

        if notify {
            NotificationService::new(self.stores.notifications.clone())
                .notify(vec![NewNotification {
                    recipient_id: target,
                    actor_id: actor,
                    kind: NotificationKind::Follow,
                    post_id: None,
                    comment_id: None,
                }])
                .await;
        }

        Ok(FollowToggle {
            is_following: followers.contains(&actor),
            followers_count: followers.len(),
        })
    }

    async fn write(
        &self,
        direction: Direction,
        field: SetField,
        owner: Uuid,
        member: Uuid,
    ) -> Result<Option<Vec<Uuid>>> {
        match direction {
            Direction::Add => self.stores.sets.add_to_set(field, owner, member).await,
            Direction::Remove => self.stores.sets.pull(field, owner, member).await,
        }
    }

    async fn notify_like(&self, actor: Uuid, post_id: Uuid) {
        let post = match self.stores.posts.get_post(post_id).await {
            Ok(Some(post)) => post,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(%post_id, error = %err, "failed to load post for like notification");
                return;
            }
        };

        NotificationService::new(self.stores.notifications.clone())
            .notify(vec![NewNotification {
                recipient_id: post.author_id,
                actor_id: actor,
                kind: NotificationKind::Like,
                post_id: Some(post_id),
                comment_id: None,
            }])
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_without_protected_account() {
        let policy = SocialPolicy::default();
        assert!(!policy.is_protected(Uuid::new_v4()));
    }

    #[test]
    fn test_policy_matches_configured_account() {
        let owner = Uuid::new_v4();
        let policy = SocialPolicy {
            protected_account_id: Some(owner),
        };
        assert!(policy.is_protected(owner));
        assert!(!policy.is_protected(Uuid::new_v4()));
    }

    #[test]
    fn test_toggle_results_serialize_camel_case() {
        let like = serde_json::to_value(LikeToggle {
            is_liked: true,
            likes_count: 3,
        })
        .unwrap();
        assert_eq!(like["isLiked"], true);
        assert_eq!(like["likesCount"], 3);

        let follow = serde_json::to_value(FollowToggle {
            is_following: false,
            followers_count: 0,
        })
        .unwrap();
        assert_eq!(follow["isFollowing"], false);
        assert_eq!(follow["followersCount"], 0);
    }
}
