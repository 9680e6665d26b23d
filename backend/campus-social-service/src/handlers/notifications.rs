/// Notification handlers
use crate::error::Result;
use crate::middleware::UserId;
use crate::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<i64>,
}

/// GET /api/v1/notifications?limit=
pub async fn list_notifications(
    state: web::Data<AppState>,
    user: UserId,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse> {
    let notifications = state.notifications().list(user.0, query.limit).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

/// POST /api/v1/notifications/read
pub async fn mark_all_read(state: web::Data<AppState>, user: UserId) -> Result<HttpResponse> {
    let updated = state.notifications().mark_all_read(user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}
