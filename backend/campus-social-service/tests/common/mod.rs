//! Shared helpers for integration tests
#![allow(dead_code)]

pub mod memory_store;

use campus_social_service::config::SocialConfig;
use campus_social_service::middleware::Claims;
use campus_social_service::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

pub use memory_store::MemoryStore;

pub const TEST_SECRET: &str = "campus-social-test-secret-0123456789";

pub fn app_state(store: &MemoryStore) -> AppState {
    AppState::new(store.stores(), SocialConfig::default())
}

pub fn app_state_with(store: &MemoryStore, social: SocialConfig) -> AppState {
    AppState::new(store.stores(), social)
}

/// HS256 token for `user_id`, valid for an hour
pub fn token_for(user_id: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (now + 3600) as usize,
        iat: now as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token_for(user_id)))
}
