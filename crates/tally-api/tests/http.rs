//! End-to-end tests over the assembled router: signup, login, posting,
//! voting, and the fallback behavior.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use tally_api::{AppStateInner, routes};
use tally_db::Database;

fn app() -> Router {
    let db = Database::open_in_memory().expect("in-memory database");
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".into(),
    });
    routes::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, bytes)
}

fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

async fn signup(app: &Router, username: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "username": username,
            "email": email,
            "password": "password1234",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse(&body)
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        parse(&body)
    };
    (status, value)
}

async fn token_for(app: &Router, email: &str) -> String {
    let (status, body) = login(app, email, "password1234").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("token").to_string()
}

#[tokio::test]
async fn signup_returns_user_without_credential() {
    let app = app();
    let user = signup(&app, "lernantino", "lernantino@example.com").await;

    assert_eq!(user["username"], "lernantino");
    assert_eq!(user["email"], "lernantino@example.com");
    assert!(user.get("password").is_none());
}

#[tokio::test]
async fn signup_rejects_invalid_email() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "username": "lernantino",
            "email": "not-an-email",
            "password": "password1234",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = parse(&body)["error"].as_str().expect("message").to_string();
    assert!(message.contains("email"));
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = app();
    signup(&app, "lernantino", "lernantino@example.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "username": "impostor",
            "email": "lernantino@example.com",
            "password": "password1234",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_rejects_a_wrong_password() {
    let app = app();
    signup(&app, "lernantino", "lernantino@example.com").await;

    let (status, _) = login(&app, "lernantino@example.com", "wrong-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = login(&app, "nobody@example.com", "password1234").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn post_and_upvote_flow() {
    let app = app();
    signup(&app, "lernantino", "lernantino@example.com").await;
    let token = token_for(&app, "lernantino@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&token),
        Some(json!({ "title": "Donut shop opens downtown", "content": "Finally." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let post = parse(&body);
    assert_eq!(post["author_username"], "lernantino");
    assert_eq!(post["vote_count"], 0);

    let post_id = post["id"].as_i64().expect("post id");
    let upvote_path = format!("/api/posts/{post_id}/upvote");

    let (status, body) = send(&app, "PUT", &upvote_path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["vote_count"], 1);

    // repeat voting is allowed until the product decides otherwise
    let (status, body) = send(&app, "PUT", &upvote_path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["vote_count"], 2);

    let (status, body) = send(&app, "GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let posts = parse(&body);
    assert_eq!(posts.as_array().expect("array").len(), 1);
    assert_eq!(posts[0]["vote_count"], 2);
}

#[tokio::test]
async fn upvote_of_a_missing_post_is_a_bad_request() {
    let app = app();
    signup(&app, "lernantino", "lernantino@example.com").await;
    let token = token_for(&app, "lernantino@example.com").await;

    let (status, _) = send(&app, "PUT", "/api/posts/99/upvote", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mutating_posts_requires_a_token() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        None,
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "PUT", "/api/posts/1/upvote", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn username_update_leaves_the_credential_working() {
    let app = app();
    let user = signup(&app, "lernantino", "lernantino@example.com").await;
    let token = token_for(&app, "lernantino@example.com").await;
    let id = user["id"].as_i64().expect("user id");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/{id}"),
        Some(&token),
        Some(json!({ "username": "lernantino2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["username"], "lernantino2");

    // the stored hash was not touched; the original password still logs in
    let (status, _) = login(&app, "lernantino@example.com", "password1234").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn missing_user_is_a_not_found() {
    let app = app();
    let (status, _) = send(&app, "GET", "/api/users/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unmatched_route_is_an_empty_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/nonexistent", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
}
