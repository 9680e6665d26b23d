/// Authorization module for campus-social-service
///
/// Ownership-based permission checks. Users may only modify content they own.
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Post;

/// Result type for permission checks
pub type PermissionResult = Result<(), AppError>;

/// Check if a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> PermissionResult {
    if post.author_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You don't have permission to modify this post".to_string(),
        ))
    }
}

/// Verify user has access to delete a post
/// Only the owner can delete their own posts
pub fn check_post_deletion(user_id: Uuid, post: &Post) -> PermissionResult {
    check_post_ownership(user_id, post)
}
