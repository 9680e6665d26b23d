/// HTTP handlers for campus-social endpoints
///
/// This module contains handlers for:
/// - Comments: threaded comment trees and comment creation
/// - Posts: create, read, delete, like toggle
/// - Users: registration, profiles, follow graph
/// - Notifications: inbox and read marking
pub mod comments;
pub mod notifications;
pub mod posts;
pub mod users;

use crate::error::AppError;
use actix_web::web;

/// JSON extractor config that reports malformed bodies in the service's error format
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Query extractor config that reports malformed query strings in the service's error format
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

/// Routes that must stay reachable without a token. Registered on the app
/// before the authenticated `/api/v1` scope so they match first.
pub fn configure_public(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/v1/users").route(web::post().to(users::register)));
}

/// Authenticated routes, mounted inside the JWT-wrapped `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/comments", web::get().to(comments::get_comments))
        .route("/posts", web::post().to(posts::create_post))
        .service(
            web::resource("/posts/{post_id}")
                .route(web::get().to(posts::get_post))
                .route(web::delete().to(posts::delete_post)),
        )
        .service(
            web::resource("/posts/{post_id}/comments")
                .route(web::get().to(comments::get_post_comments))
                .route(web::post().to(comments::create_comment)),
        )
        .route("/posts/{post_id}/like", web::post().to(posts::toggle_like))
        .route("/users/me", web::patch().to(users::update_profile))
        .route("/users/{user_id}", web::get().to(users::get_profile))
        .route("/users/{user_id}/followers", web::get().to(users::get_followers))
        .route("/users/{user_id}/following", web::get().to(users::get_following))
        .service(
            web::resource("/users/{user_id}/follow")
                .route(web::post().to(users::toggle_follow))
                .route(web::put().to(users::follow))
                .route(web::delete().to(users::unfollow)),
        )
        .route("/notifications", web::get().to(notifications::list_notifications))
        .route("/notifications/read", web::post().to(notifications::mark_all_read));
}
