//! In-memory store for integration tests
//!
//! Implements every store trait over one shared state so services and the HTTP
//! surface can be exercised without PostgreSQL.

use async_trait::async_trait;
use campus_social_service::db::{
    CommentStore, MembershipStore, NotificationStore, PostStore, SetField, Stores, UserStore,
};
use campus_social_service::error::{AppError, Result};
use campus_social_service::models::{
    Comment, NewComment, NewNotification, NewPost, NewUser, Notification, Post, ProfilePatch,
    User,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: Vec<Comment>,
    notifications: Vec<Notification>,
    clock: i64,
    comment_queries: usize,
    user_batch_queries: usize,
    set_writes: usize,
    fail_notifications: bool,
}

impl State {
    /// Strictly increasing timestamps so ordering is deterministic
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(self.clock)
    }

    fn set_mut(&mut self, field: SetField, owner: Uuid) -> Option<&mut Vec<Uuid>> {
        match field {
            SetField::PostLikes => self.posts.get_mut(&owner).map(|p| &mut p.likes),
            SetField::UserFollowers => self.users.get_mut(&owner).map(|u| &mut u.followers),
            SetField::UserFollowing => self.users.get_mut(&owner).map(|u| &mut u.following),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five stores backed by this instance
    pub fn stores(&self) -> Stores {
        Stores {
            comments: Arc::new(self.clone()),
            posts: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            sets: Arc::new(self.clone()),
            notifications: Arc::new(self.clone()),
        }
    }

    pub fn add_user(&self, username: &str) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let id = Uuid::new_v4();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: format!("{}@campus.edu", username),
                password_hash: "$argon2id$test".to_string(),
                display_name: None,
                bio: None,
                avatar_url: None,
                followers: vec![],
                following: vec![],
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn add_post(&self, author_id: Uuid, is_anonymous: bool) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let id = Uuid::new_v4();
        state.posts.insert(
            id,
            Post {
                id,
                author_id,
                content: "midterm study group?".to_string(),
                image_url: None,
                is_anonymous,
                likes: vec![],
                created_at: now,
            },
        );
        id
    }

    pub fn add_comment(&self, post_id: Uuid, user_id: Uuid, parent: Option<Uuid>) -> Uuid {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let id = Uuid::new_v4();
        state.comments.push(Comment {
            id,
            post_id,
            user_id,
            content: "reply".to_string(),
            parent_comment_id: parent,
            image_url: None,
            created_at: now,
        });
        id
    }

    pub fn delete_user(&self, user_id: Uuid) {
        self.state.lock().unwrap().users.remove(&user_id);
    }

    pub fn set_likes(&self, post_id: Uuid, likes: Vec<Uuid>) {
        if let Some(post) = self.state.lock().unwrap().posts.get_mut(&post_id) {
            post.likes = likes;
        }
    }

    pub fn likes(&self, post_id: Uuid) -> Vec<Uuid> {
        self.state.lock().unwrap().posts[&post_id].likes.clone()
    }

    pub fn user(&self, user_id: Uuid) -> User {
        self.state.lock().unwrap().users[&user_id].clone()
    }

    pub fn notifications_for(&self, recipient_id: Uuid) -> Vec<Notification> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect()
    }

    pub fn comment_queries(&self) -> usize {
        self.state.lock().unwrap().comment_queries
    }

    pub fn user_batch_queries(&self) -> usize {
        self.state.lock().unwrap().user_batch_queries
    }

    pub fn set_writes(&self) -> usize {
        self.state.lock().unwrap().set_writes
    }

    pub fn fail_notifications(&self) {
        self.state.lock().unwrap().fail_notifications = true;
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, new: NewComment) -> Result<Comment> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: new.post_id,
            user_id: new.user_id,
            content: new.content,
            parent_comment_id: new.parent_comment_id,
            image_url: new.image_url,
            created_at: now,
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, comment_id: Uuid) -> Result<Option<Comment>> {
        let state = self.state.lock().unwrap();
        Ok(state.comments.iter().find(|c| c.id == comment_id).cloned())
    }

    async fn comments_for_posts(&self, post_ids: &[Uuid]) -> Result<Vec<Comment>> {
        let mut state = self.state.lock().unwrap();
        state.comment_queries += 1;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| post_ids.contains(&c.post_id))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, new: NewPost) -> Result<Post> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: new.author_id,
            content: new.content,
            image_url: new.image_url,
            is_anonymous: new.is_anonymous,
            likes: vec![],
            created_at: now,
        };
        state.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        Ok(self.state.lock().unwrap().posts.get(&post_id).cloned())
    }

    async fn delete_post(&self, post_id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let removed = state.posts.remove(&post_id).is_some();
        if removed {
            state.comments.retain(|c| c.post_id != post_id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let mut state = self.state.lock().unwrap();
        let taken = state.users.values().any(|u| {
            u.username.eq_ignore_ascii_case(&new.username) || u.email.eq_ignore_ascii_case(&new.email)
        });
        if taken {
            return Err(AppError::Conflict(
                "Username or email already registered".to_string(),
            ));
        }

        let now = state.tick();
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            display_name: None,
            bio: None,
            avatar_url: None,
            followers: vec![],
            following: vec![],
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>> {
        let mut state = self.state.lock().unwrap();
        state.user_batch_queries += 1;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .filter(|u| usernames.iter().any(|n| n.eq_ignore_ascii_case(&u.username)))
            .cloned()
            .collect())
    }

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> Result<Option<User>> {
        let mut state = self.state.lock().unwrap();
        let now = state.tick();
        Ok(state.users.get_mut(&user_id).map(|user| {
            if let Some(display_name) = &patch.display_name {
                user.display_name = Some(display_name.clone());
            }
            if let Some(bio) = &patch.bio {
                user.bio = Some(bio.clone());
            }
            if let Some(avatar_url) = &patch.avatar_url {
                user.avatar_url = Some(avatar_url.clone());
            }
            user.updated_at = now;
            user.clone()
        }))
    }
}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn members(&self, field: SetField, owner: Uuid) -> Result<Option<Vec<Uuid>>> {
        let mut state = self.state.lock().unwrap();
        Ok(state.set_mut(field, owner).map(|set| set.clone()))
    }

    async fn add_to_set(
        &self,
        field: SetField,
        owner: Uuid,
        member: Uuid,
    ) -> Result<Option<Vec<Uuid>>> {
        let mut state = self.state.lock().unwrap();
        let result = state.set_mut(field, owner).map(|set| {
            if !set.contains(&member) {
                set.push(member);
            }
            set.clone()
        });
        if result.is_some() {
            state.set_writes += 1;
        }
        Ok(result)
    }

    async fn pull(&self, field: SetField, owner: Uuid, member: Uuid) -> Result<Option<Vec<Uuid>>> {
        let mut state = self.state.lock().unwrap();
        let result = state.set_mut(field, owner).map(|set| {
            set.retain(|m| *m != member);
            set.clone()
        });
        if result.is_some() {
            state.set_writes += 1;
        }
        Ok(result)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notifications(&self, batch: &[NewNotification]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        if state.fail_notifications {
            return Err(AppError::Database("notifications table unavailable".to_string()));
        }
        for new in batch {
            let now = state.tick();
            state.notifications.push(Notification {
                id: Uuid::new_v4(),
                recipient_id: new.recipient_id,
                actor_id: new.actor_id,
                kind: new.kind,
                post_id: new.post_id,
                comment_id: new.comment_id,
                is_read: false,
                created_at: now,
            });
        }
        Ok(batch.len() as u64)
    }

    async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>> {
        let state = self.state.lock().unwrap();
        let mut notifications: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications.truncate(limit as usize);
        Ok(notifications)
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        let mut updated = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
