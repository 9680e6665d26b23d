/// Campus Social Service Library
///
/// Posts, threaded comments, likes, the follow graph and notifications for the
/// campus social platform.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: Stored records and client-facing views
/// - `services`: Business logic (comment trees, toggles, posts, users, notifications)
/// - `db`: Store traits and PostgreSQL repositories
/// - `middleware`: JWT authentication and request metrics
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
/// - `ids`: Identifier parsing
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use config::SocialConfig;
use db::Stores;
use services::{
    CommentService, NotificationService, PostService, SocialGraphService, SocialPolicy,
    UserService,
};

/// Shared handler state; services are cheap to build per request.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub social: SocialConfig,
}

impl AppState {
    pub fn new(stores: Stores, social: SocialConfig) -> Self {
        Self { stores, social }
    }

    pub fn comments(&self) -> CommentService {
        CommentService::new(self.stores.clone(), &self.social)
    }

    pub fn social_graph(&self) -> SocialGraphService {
        SocialGraphService::new(self.stores.clone(), SocialPolicy::from_config(&self.social))
    }

    pub fn posts(&self) -> PostService {
        PostService::new(self.stores.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.stores.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.stores.notifications.clone())
    }
}
