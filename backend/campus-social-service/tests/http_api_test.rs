//! HTTP surface tests: routing, authentication ordering and response shapes

mod common;

use actix_web::{test, web, App};
use campus_social_service::config::SocialConfig;
use campus_social_service::handlers;
use campus_social_service::middleware::JwtAuthMiddleware;
use common::{app_state, app_state_with, bearer, MemoryStore, TEST_SECRET};
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(handlers::json_config())
                .app_data(handlers::query_config())
                .configure(handlers::configure_public)
                .service(
                    web::scope("/api/v1")
                        .wrap(JwtAuthMiddleware::new(TEST_SECRET))
                        .configure(handlers::configure),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_unauthenticated_request_rejected_before_id_validation() {
    let store = MemoryStore::new();
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri("/api/v1/posts/not-an-id/like")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "authentication_required");
    assert_eq!(body["status"], 401);
}

#[actix_web::test]
async fn test_malformed_id_is_validation_error() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri("/api/v1/posts/not-an-id/like")
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn test_single_post_comments_shape() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let post = store.add_post(alice, false);
    let root = store.add_comment(post, alice, None);
    let reply = store.add_comment(post, alice, Some(root));
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comments?postId={}", post))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("commentsByPost").is_none());
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], json!(root));
    assert_eq!(comments[0]["postId"], json!(post));
    assert_eq!(comments[0]["author"]["username"], "alice");
    assert_eq!(comments[0]["replies"][0]["id"], json!(reply));
    assert_eq!(comments[0]["replies"][0]["parentCommentId"], json!(root));
}

#[actix_web::test]
async fn test_batch_comments_shape_has_every_requested_post() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let busy = store.add_post(alice, false);
    let quiet = store.add_post(alice, false);
    store.add_comment(busy, alice, None);
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/comments?postId={},{}", busy, quiet))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("comments").is_none());
    let by_post = body["commentsByPost"].as_object().unwrap();
    assert_eq!(by_post.len(), 2);
    assert_eq!(by_post[&busy.to_string()].as_array().unwrap().len(), 1);
    assert!(by_post[&quiet.to_string()].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_batch_with_one_bad_id_fails_whole_request() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let post = store.add_post(alice, false);
    let app = test_app!(app_state(&store));

    for uri in [
        format!("/api/v1/comments?postId={},garbage", post),
        format!("/api/v1/comments?postId={},,", post),
        "/api/v1/comments".to_string(),
    ] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(alice))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400, "{}", uri);
    }
    assert_eq!(store.comment_queries(), 0);
}

#[actix_web::test]
async fn test_post_comments_route_and_create() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let post = store.add_post(alice, false);
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/comments", post))
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/comments", post))
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "second", "parentCommentId": created["id"] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}/comments", post))
        .insert_header(bearer(alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["comments"][0]["content"], "first!");
    assert_eq!(body["comments"][0]["replies"][0]["content"], "second");
}

#[actix_web::test]
async fn test_malformed_json_body_is_validation_error() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let post = store.add_post(alice, false);
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/comments", post))
        .insert_header(bearer(alice))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[actix_web::test]
async fn test_like_toggle_response() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let post = store.add_post(alice, false);
    let app = test_app!(app_state(&store));

    let like = || {
        test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/like", post))
            .insert_header(bearer(bob))
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(body, json!({ "message": "Post liked", "isLiked": true, "likesCount": 1 }));

    let body: Value = test::call_and_read_body_json(&app, like()).await;
    assert_eq!(body, json!({ "message": "Post unliked", "isLiked": false, "likesCount": 0 }));
}

#[actix_web::test]
async fn test_like_unknown_post_is_404() {
    let store = MemoryStore::new();
    let bob = store.add_user("bob");
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/like", Uuid::new_v4()))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_follow_routes() {
    let store = MemoryStore::new();
    let owner = store.add_user("campus_official");
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let social = SocialConfig {
        protected_account_id: Some(owner),
        ..SocialConfig::default()
    };
    let app = test_app!(app_state_with(&store, social));

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/follow", bob))
        .insert_header(bearer(alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({ "message": "User followed", "isFollowing": true, "followersCount": 1 })
    );

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}/follow", bob))
        .insert_header(bearer(alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["isFollowing"], false);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/users/{}/follow", alice))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "forbidden");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/users/{}/follow", owner))
        .insert_header(bearer(alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "protected_account");
}

#[actix_web::test]
async fn test_registration_is_public_and_profile_hides_credentials() {
    let store = MemoryStore::new();
    let app = test_app!(app_state(&store));

    let payload = json!({
        "username": "quad_runner",
        "email": "runner@campus.edu",
        "password": "laps-around-the-quad"
    });

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let profile: Value = test::read_body_json(resp).await;
    assert!(profile.get("email").is_none());
    assert!(profile.get("passwordHash").is_none());
    assert_eq!(profile["followersCount"], 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 409);

    let id: Uuid = serde_json::from_value(profile["id"].clone()).unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/users/{}", id))
        .insert_header(bearer(id))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["username"], "quad_runner");
}

#[actix_web::test]
async fn test_anonymous_post_response_omits_author() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::post()
        .uri("/api/v1/posts")
        .insert_header(bearer(alice))
        .set_json(json!({ "content": "confession: I never did the reading", "isAnonymous": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Value = test::read_body_json(resp).await;
    assert!(created.get("author").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", created["id"].as_str().unwrap()))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let raw = test::read_body(resp).await;
    let text = std::str::from_utf8(&raw).unwrap();
    assert!(!text.contains(&alice.to_string()));
    assert!(!text.contains("\"author\""));
}

#[actix_web::test]
async fn test_notifications_routes() {
    let store = MemoryStore::new();
    let alice = store.add_user("alice");
    let bob = store.add_user("bob");
    let app = test_app!(app_state(&store));

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/users/{}/follow", alice))
        .insert_header(bearer(bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications?limit=5")
        .insert_header(bearer(alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body[0]["kind"], "follow");
    assert_eq!(body[0]["actorId"], json!(bob));
    assert_eq!(body[0]["isRead"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/notifications/read")
        .insert_header(bearer(alice))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "updated": 1 }));
}
