use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};

use tally_db::StoreError;
use tally_db::models::{NewPost, NewVote, PostPatch, PostRow};
use tally_types::api::{Claims, CreatePostRequest, PostResponse, UpdatePostRequest};

use crate::error::ApiError;
use crate::{AppState, blocking};

fn to_response(row: PostRow) -> PostResponse {
    PostResponse {
        id: row.id,
        title: row.title,
        content: row.content,
        user_id: row.user_id,
        author_username: row.author_username,
        vote_count: row.vote_count,
    }
}

/// POST /api/posts — the owner is the token subject.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = NewPost {
        title: req.title,
        content: req.content,
        user_id: claims.sub,
    };
    let row = blocking(move || state.db.create_post(&new)).await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// GET /api/posts — newest first, with owner username and vote tally.
pub async fn list_posts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || state.db.list_posts()).await?;
    let posts: Vec<PostResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(move || state.db.get_post(id))
        .await?
        .ok_or(StoreError::NotFound)?;
    Ok(Json(to_response(row)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = PostPatch {
        title: req.title,
        content: req.content,
    };
    let row = blocking(move || state.db.update_post(id, &patch)).await?;
    Ok(Json(to_response(row)))
}

/// DELETE /api/posts/{id} — cascades to the post's votes.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || state.db.delete_post(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/posts/{id}/upvote — records a vote by the token subject and
/// returns the post with its updated tally.
pub async fn upvote_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(move || {
        state.db.create_vote(&NewVote {
            user_id: claims.sub,
            post_id: id,
        })?;
        state.db.get_post(id)?.ok_or(StoreError::NotFound)
    })
    .await?;

    Ok(Json(to_response(row)))
}
