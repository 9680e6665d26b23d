/// Comment handlers - HTTP endpoints for comment operations
use crate::error::{AppError, Result};
use crate::ids::parse_object_id;
use crate::middleware::UserId;
use crate::services::CreateCommentInput;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct CommentsQuery {
    #[serde(rename = "postId")]
    pub post_id: Option<String>,
}

/// Request body for creating a comment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    pub parent_comment_id: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Comment trees for one post or a comma-separated batch
/// GET /api/v1/comments?postId=<id>[,<id>...]
///
/// A single id answers `{ "comments": [...] }`, a batch answers
/// `{ "commentsByPost": { "<id>": [...] } }`.
pub async fn get_comments(
    state: web::Data<AppState>,
    _user: UserId,
    query: web::Query<CommentsQuery>,
) -> Result<HttpResponse> {
    let raw = query
        .post_id
        .as_deref()
        .ok_or_else(|| AppError::Validation("postId is required".to_string()))?;

    let is_batch = raw.contains(',');
    let (post_ids, mut forest) = state.comments().fetch_comment_trees_raw(raw).await?;

    if is_batch {
        return Ok(HttpResponse::Ok().json(json!({ "commentsByPost": forest })));
    }

    let comments = forest.remove(&post_ids[0]).unwrap_or_default();
    Ok(HttpResponse::Ok().json(json!({ "comments": comments })))
}

/// Comment tree for a single post
/// GET /api/v1/posts/{post_id}/comments
pub async fn get_post_comments(
    state: web::Data<AppState>,
    _user: UserId,
    post_id: web::Path<String>,
) -> Result<HttpResponse> {
    let post_id = parse_object_id(&post_id)?;
    let mut forest = state.comments().fetch_comment_trees(&[post_id]).await?;
    let comments = forest.remove(&post_id).unwrap_or_default();

    Ok(HttpResponse::Ok().json(json!({ "comments": comments })))
}

/// Create a new comment
/// POST /api/v1/posts/{post_id}/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    user: UserId,
    post_id: web::Path<String>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let post_id = parse_object_id(&post_id)?;
    let req = req.into_inner();
    req.validate()?;

    let parent_comment_id = req
        .parent_comment_id
        .as_deref()
        .map(parse_object_id)
        .transpose()?;

    let comment = state
        .comments()
        .create_comment(
            user.0,
            post_id,
            CreateCommentInput {
                content: req.content,
                parent_comment_id,
                image_url: req.image_url,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(comment))
}
