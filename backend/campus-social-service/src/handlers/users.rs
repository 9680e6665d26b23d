/// User handlers - registration, profiles and the follow graph
use crate::error::Result;
use crate::ids::parse_object_id;
use crate::middleware::UserId;
use crate::services::{FollowToggle, RegisterInput, UpdateProfileInput};
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub toggle: FollowToggle,
}

impl From<FollowToggle> for FollowResponse {
    fn from(toggle: FollowToggle) -> Self {
        let message = if toggle.is_following {
            "User followed"
        } else {
            "User unfollowed"
        };
        Self { message, toggle }
    }
}

/// Register an account
/// POST /api/v1/users
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterInput>,
) -> Result<HttpResponse> {
    let profile = state.users().register(req.into_inner()).await?;
    Ok(HttpResponse::Created().json(profile))
}

/// GET /api/v1/users/{user_id}
pub async fn get_profile(
    state: web::Data<AppState>,
    _user: UserId,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_object_id(&user_id)?;
    let profile = state.users().get_profile(user_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// PATCH /api/v1/users/me
pub async fn update_profile(
    state: web::Data<AppState>,
    user: UserId,
    req: web::Json<UpdateProfileInput>,
) -> Result<HttpResponse> {
    let profile = state
        .users()
        .update_profile(user.0, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /api/v1/users/{user_id}/followers
pub async fn get_followers(
    state: web::Data<AppState>,
    _user: UserId,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_object_id(&user_id)?;
    let followers = state.users().followers(user_id).await?;
    Ok(HttpResponse::Ok().json(followers))
}

/// GET /api/v1/users/{user_id}/following
pub async fn get_following(
    state: web::Data<AppState>,
    _user: UserId,
    user_id: web::Path<String>,
) -> Result<HttpResponse> {
    let user_id = parse_object_id(&user_id)?;
    let following = state.users().following(user_id).await?;
    Ok(HttpResponse::Ok().json(following))
}

/// Follow if not following, otherwise unfollow
/// POST /api/v1/users/{user_id}/follow
pub async fn toggle_follow(
    state: web::Data<AppState>,
    user: UserId,
    target: web::Path<String>,
) -> Result<HttpResponse> {
    let target = parse_object_id(&target)?;
    let toggle = state.social_graph().toggle_follow(user.0, target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse::from(toggle)))
}

/// PUT /api/v1/users/{user_id}/follow
pub async fn follow(
    state: web::Data<AppState>,
    user: UserId,
    target: web::Path<String>,
) -> Result<HttpResponse> {
    let target = parse_object_id(&target)?;
    let toggle = state.social_graph().follow(user.0, target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse::from(toggle)))
}

/// DELETE /api/v1/users/{user_id}/follow
pub async fn unfollow(
    state: web::Data<AppState>,
    user: UserId,
    target: web::Path<String>,
) -> Result<HttpResponse> {
    let target = parse_object_id(&target)?;
    let toggle = state.social_graph().unfollow(user.0, target).await?;
    Ok(HttpResponse::Ok().json(FollowResponse::from(toggle)))
}
