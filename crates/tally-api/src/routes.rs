//! Route assembly. Endpoints are collected under the `/api` prefix; a
//! request that matches nothing gets a 404 with an empty body. Mutating
//! routes check the bearer token; signup, login, and reads stay open.

use axum::handler::Handler;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::middleware::require_auth;
use crate::{AppState, posts, users};

pub fn router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), require_auth);

    let api = Router::new()
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/users/login", post(users::login))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user.layer(auth.clone()))
                .delete(users::delete_user.layer(auth.clone())),
        )
        .route(
            "/posts",
            get(posts::list_posts).post(posts::create_post.layer(auth.clone())),
        )
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post.layer(auth.clone()))
                .delete(posts::delete_post.layer(auth.clone())),
        )
        .route("/posts/{id}/upvote", put(posts::upvote_post.layer(auth)));

    Router::new()
        .nest("/api", api)
        .fallback(fallback)
        .with_state(state)
}

async fn fallback() -> StatusCode {
    StatusCode::NOT_FOUND
}
