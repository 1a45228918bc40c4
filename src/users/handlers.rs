use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    DuplicateResponse, EmailQuery, IdResponse, NicknameQuery, SignUpRequest, UserInfo,
};
use crate::{auth::extractors::AuthHeader, error::AppResult, state::AppState};

pub fn check_routes() -> Router<AppState> {
    Router::new()
        .route("/users/check-email", get(check_email))
        .route("/users/check-nickname", get(check_nickname))
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).delete(delete_me))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(sign_up))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state))]
pub async fn check_email(
    State(state): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> AppResult<Json<DuplicateResponse>> {
    let duplicate = state.users.is_email_duplicate(&q.email).await?;
    Ok(Json(DuplicateResponse { duplicate }))
}

#[instrument(skip(state))]
pub async fn check_nickname(
    State(state): State<AppState>,
    Query(q): Query<NicknameQuery>,
) -> AppResult<Json<DuplicateResponse>> {
    let duplicate = state.users.is_nickname_duplicate(&q.nickname).await?;
    Ok(Json(DuplicateResponse { duplicate }))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<IdResponse>)> {
    let res = state.users.sign_up(payload).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip_all)]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthHeader(token): AuthHeader,
) -> AppResult<StatusCode> {
    state.users.delete_account(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthHeader(token): AuthHeader,
) -> AppResult<Json<UserInfo>> {
    Ok(Json(state.users.get_user_info(&token).await?))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserInfo>> {
    Ok(Json(state.users.get_user_info_by_id(id).await?))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserInfo>>> {
    Ok(Json(state.users.get_all_user_info().await?))
}
