/// Business logic layer for campus-social-service
///
/// This module provides high-level operations:
/// - Comment tree assembly and comment creation
/// - Like / follow toggles over set-valued fields
/// - Post, user and notification services
pub mod comment_tree;
pub mod comments;
pub mod mentions;
pub mod notifications;
pub mod posts;
pub mod toggles;
pub mod users;

// Re-export commonly used services
pub use comment_tree::{CommentForest, CommentTreeBuilder, OrphanPolicy};
pub use comments::{CommentService, CreateCommentInput};
pub use notifications::NotificationService;
pub use posts::PostService;
pub use toggles::{FollowToggle, LikeToggle, SocialGraphService, SocialPolicy};
pub use users::{RegisterInput, UpdateProfileInput, UserService};
