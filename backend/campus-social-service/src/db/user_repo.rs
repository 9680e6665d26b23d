use crate::error::Result;
use crate::models::{NewUser, ProfilePatch, User};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// User persistence. The follower / following sets are only mutated through
/// [`MembershipStore`](super::MembershipStore).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; duplicate username or email surfaces as `Conflict`
    async fn insert_user(&self, new: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>>;

    /// Bulk lookup; missing ids are simply absent from the result
    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>>;

    /// Bulk lookup by case-insensitive username
    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>>;

    /// Apply a partial profile update; `None` if the user does not exist
    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> Result<Option<User>>;
}

/// Repository for User operations
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, display_name, bio, avatar_url,
                      followers, following, created_at, updated_at
            "#,
        )
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, display_name, bio, avatar_url,
                   followers, following, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, display_name, bio, avatar_url,
                   followers, following, created_at, updated_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<User>> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }

        let lowered: Vec<String> = usernames.iter().map(|u| u.to_lowercase()).collect();
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, display_name, bio, avatar_url,
                   followers, following, created_at, updated_at
            FROM users
            WHERE LOWER(username) = ANY($1)
            "#,
        )
        .bind(&lowered)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_profile(&self, user_id: Uuid, patch: &ProfilePatch) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                bio = COALESCE($3, bio),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, display_name, bio, avatar_url,
                      followers, following, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(patch.display_name.as_deref())
        .bind(patch.bio.as_deref())
        .bind(patch.avatar_url.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
