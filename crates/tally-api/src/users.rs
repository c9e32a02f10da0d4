use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use jsonwebtoken::{EncodingKey, Header, encode};

use tally_db::StoreError;
use tally_db::models::{NewUser, UserPatch, UserRow};
use tally_types::api::{
    Claims, CreateUserRequest, LoginRequest, LoginResponse, UpdateUserRequest, UserResponse,
};

use crate::error::ApiError;
use crate::{AppState, blocking};

fn to_response(row: UserRow) -> UserResponse {
    UserResponse {
        id: row.id,
        username: row.username,
        email: row.email,
    }
}

/// POST /api/users — signup. The gateway validates and hashes; the
/// response never carries the credential.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = NewUser {
        username: req.username,
        email: req.email,
        password: req.password,
    };
    let row = blocking(move || state.db.create_user(&new)).await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

/// POST /api/users/login — verify the credential, issue a bearer token.
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let LoginRequest { email, password } = req;
    let db_state = state.clone();

    // lookup and the CPU-bound verify both stay off the async workers
    let user = blocking(move || {
        let Some(user) = db_state.db.get_user_by_email(&email)? else {
            return Ok(None);
        };
        let ok = tally_auth::verify_password(&password, &user.password)?;
        Ok(ok.then_some(user))
    })
    .await?
    .ok_or(ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, user.id, &user.username)?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
        token,
    }))
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(move || state.db.list_users()).await?;
    let users: Vec<UserResponse> = rows.into_iter().map(to_response).collect();
    Ok(Json(users))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let row = blocking(move || state.db.get_user(id))
        .await?
        .ok_or(StoreError::NotFound)?;
    Ok(Json(to_response(row)))
}

/// PUT /api/users/{id} — partial update; a present password is re-hashed
/// by the gateway, an absent one leaves the stored hash untouched.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = UserPatch {
        username: req.username,
        email: req.email,
        password: req.password,
    };
    let row = blocking(move || state.db.update_user(id, &patch)).await?;
    Ok(Json(to_response(row)))
}

/// DELETE /api/users/{id} — cascades to the user's posts and votes.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    blocking(move || state.db.delete_user(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn create_token(secret: &str, user_id: i64, username: &str) -> Result<String, ApiError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal)
}
