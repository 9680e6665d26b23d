/// User service - registration, profiles, and follow lists
use crate::db::Stores;
use crate::error::{AppError, Result};
use crate::models::{AuthorSummary, NewUser, ProfilePatch, User, UserProfile};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;
use validator::Validate;

static USERNAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Invalid username regex"));

/// Registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(
        length(min = 3, max = 30, message = "Username must be 3-30 characters"),
        regex(path = *USERNAME_REGEX, message = "Username may only contain letters, digits and underscores")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 50))]
    pub display_name: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(rand::thread_rng());

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::Internal("Failed to hash password".to_string()))
}

pub struct UserService {
    stores: Stores,
}

impl UserService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    /// Register a new account. Duplicate username or email surfaces as `Conflict`.
    pub async fn register(&self, input: RegisterInput) -> Result<UserProfile> {
        input.validate()?;

        let password_hash = hash_password(&input.password)?;
        let user = self
            .stores
            .users
            .insert_user(NewUser {
                username: input.username,
                email: input.email.trim().to_lowercase(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(UserProfile::from(&user))
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile> {
        let user = self.load(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Apply a partial profile update; absent fields stay as they are.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<UserProfile> {
        input.validate()?;

        let patch = ProfilePatch {
            display_name: input.display_name,
            bio: input.bio,
            avatar_url: input.avatar_url,
        };
        if patch.is_empty() {
            return self.get_profile(user_id).await;
        }

        let user = self
            .stores
            .users
            .update_profile(user_id, &patch)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

        tracing::debug!(%user_id, "profile updated");
        Ok(UserProfile::from(&user))
    }

    pub async fn followers(&self, user_id: Uuid) -> Result<Vec<AuthorSummary>> {
        let user = self.load(user_id).await?;
        self.summaries(&user.followers).await
    }

    pub async fn following(&self, user_id: Uuid) -> Result<Vec<AuthorSummary>> {
        let user = self.load(user_id).await?;
        self.summaries(&user.following).await
    }

    async fn load(&self, user_id: Uuid) -> Result<User> {
        self.stores
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// One bulk lookup; result follows the order of `ids`, skipping deleted accounts.
    async fn summaries(&self, ids: &[Uuid]) -> Result<Vec<AuthorSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users: HashMap<Uuid, User> = self
            .stores
            .users
            .get_users_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| users.get(id).map(AuthorSummary::from))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn input(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_is_argon2id_and_verifies() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"correct horse battery", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong", &parsed)
            .is_err());
    }

    #[test]
    fn test_register_input_validation() {
        assert!(input("campus_kid", "kid@uni.edu", "longenough").validate().is_ok());
        assert!(input("ab", "kid@uni.edu", "longenough").validate().is_err());
        assert!(input("bad name", "kid@uni.edu", "longenough").validate().is_err());
        assert!(input("campus_kid", "not-an-email", "longenough").validate().is_err());
        assert!(input("campus_kid", "kid@uni.edu", "short").validate().is_err());
    }

    #[test]
    fn test_profile_input_rejects_long_bio() {
        let input = UpdateProfileInput {
            bio: Some("x".repeat(501)),
            ..Default::default()
        };
        assert!(input.validate().is_err());
    }
}
