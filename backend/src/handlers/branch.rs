//! Branch management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::branch::{Branch, BranchInput};
use crate::services::BranchService;
use crate::AppState;

pub async fn list_branches(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Branch>>> {
    user.require(Resource::Branch, Action::View)?;
    let branches = BranchService::new(state.db.clone()).list_branches().await?;
    Ok(Json(branches))
}

pub async fn get_branch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(branch_id): Path<Uuid>,
) -> AppResult<Json<Branch>> {
    user.require(Resource::Branch, Action::View)?;
    let branch = BranchService::new(state.db.clone()).get_branch(branch_id).await?;
    Ok(Json(branch))
}

pub async fn create_branch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<BranchInput>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    user.require(Resource::Branch, Action::Create)?;
    let branch = BranchService::new(state.db.clone()).create_branch(input).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

pub async fn update_branch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(branch_id): Path<Uuid>,
    Json(input): Json<BranchInput>,
) -> AppResult<Json<Branch>> {
    user.require(Resource::Branch, Action::Edit)?;
    let branch = BranchService::new(state.db.clone())
        .update_branch(branch_id, input)
        .await?;
    Ok(Json(branch))
}

pub async fn delete_branch(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(branch_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Branch, Action::Delete)?;
    BranchService::new(state.db.clone()).delete_branch(branch_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
