/// Post handlers - HTTP endpoints for post operations
use crate::error::Result;
use crate::ids::parse_object_id;
use crate::middleware::UserId;
use crate::services::LikeToggle;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(length(max = 5000, message = "Post content is limited to 5000 characters"))]
    #[serde(default)]
    pub content: String,
    #[validate(url)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub toggle: LikeToggle,
}

/// Create a new post
/// POST /api/v1/posts
pub async fn create_post(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    req.validate()?;

    let post = state
        .posts()
        .create_post(user.0, &req.content, req.image_url, req.is_anonymous)
        .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Get a post by ID
/// GET /api/v1/posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_object_id(&post_id)?;
    let post = state.posts().get_post(post_id, user.0).await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Delete a post
/// DELETE /api/v1/posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_object_id(&post_id)?;
    state.posts().delete_post(post_id, user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Like or unlike a post
/// POST /api/v1/posts/{post_id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_object_id(&post_id)?;
    let toggle = state.social_graph().toggle_like(user.0, post_id).await?;

    let message = if toggle.is_liked {
        "Post liked"
    } else {
        "Post unliked"
    };
    Ok(HttpResponse::Ok().json(LikeResponse { message, toggle }))
}
