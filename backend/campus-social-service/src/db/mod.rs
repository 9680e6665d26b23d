/// Database access layer
///
/// This module provides:
/// - Connection pool creation and migrations
/// - Store traits consumed by the service layer
/// - PostgreSQL repository implementations of those traits
pub mod comment_repo;
pub mod notification_repo;
pub mod post_repo;
pub mod set_repo;
pub mod user_repo;

pub use comment_repo::{CommentStore, PgCommentRepository};
pub use notification_repo::{NotificationStore, PgNotificationRepository};
pub use post_repo::{PgPostRepository, PostStore};
pub use set_repo::{MembershipStore, PgSetRepository, SetField};
pub use user_repo::{PgUserRepository, UserStore};

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;

/// Create the PostgreSQL connection pool
pub async fn create_pool(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    tracing::info!(
        max_connections = cfg.max_connections,
        min_connections = cfg.min_connections,
        acquire_timeout_secs = cfg.acquire_timeout_secs,
        "Creating database pool"
    );

    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.url)
        .await
}

/// Apply the bundled migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Every store the services need, behind trait objects so tests can swap in
/// an in-memory implementation.
#[derive(Clone)]
pub struct Stores {
    pub comments: Arc<dyn CommentStore>,
    pub posts: Arc<dyn PostStore>,
    pub users: Arc<dyn UserStore>,
    pub sets: Arc<dyn MembershipStore>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            sets: Arc::new(PgSetRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }
}
