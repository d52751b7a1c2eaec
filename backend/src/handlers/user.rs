//! User administration HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use super::BranchQuery;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::user::{CreateUserInput, UpdateUserInput, User};
use crate::services::UserService;
use crate::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BranchQuery>,
) -> AppResult<Json<Vec<User>>> {
    user.require(Resource::User, Action::View)?;
    let users = UserService::new(state.db.clone()).list_users(query.branch_id).await?;
    Ok(Json(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    user.require(Resource::User, Action::View)?;
    let found = UserService::new(state.db.clone()).get_user(user_id).await?;
    Ok(Json(found))
}

pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<User>)> {
    user.require(Resource::User, Action::Create)?;
    let created = UserService::new(state.db.clone()).create_user(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<User>> {
    user.require(Resource::User, Action::Edit)?;
    let updated = UserService::new(state.db.clone()).update_user(user_id, input).await?;
    Ok(Json(updated))
}

/// Disable login and revoke outstanding refresh tokens
pub async fn deactivate_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    user.require(Resource::User, Action::Delete)?;
    let updated = UserService::new(state.db.clone())
        .deactivate_user(user.user_id, user_id)
        .await?;
    Ok(Json(updated))
}

pub async fn activate_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<User>> {
    user.require(Resource::User, Action::Edit)?;
    let updated = UserService::new(state.db.clone()).activate_user(user_id).await?;
    Ok(Json(updated))
}
