//! Production stage, entry and machine HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::production::{
    AdvanceStageInput, CompleteEntryInput, EntryFilter, Machine, MachineFilter, MachineInput,
    ProductionEntry, ProductionLog, RejectEntryInput, StageProgress, StartEntryInput,
    UpdateEntryInput,
};
use crate::services::ProductionService;
use crate::AppState;

// ============================================================================
// Stages
// ============================================================================

pub async fn get_stage_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<StageProgress>> {
    user.require(Resource::Production, Action::View)?;
    let progress = ProductionService::new(state.db.clone())
        .stage_progress(order_id)
        .await?;
    Ok(Json(progress))
}

/// Move an order to its next stage
pub async fn advance_stage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<AdvanceStageInput>,
) -> AppResult<(StatusCode, Json<ProductionLog>)> {
    user.require(Resource::Production, Action::Approve)?;
    let log = ProductionService::new(state.db.clone())
        .advance_stage(user.user_id, order_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn list_stage_logs(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductionLog>>> {
    user.require(Resource::Production, Action::View)?;
    let logs = ProductionService::new(state.db.clone()).list_logs(order_id).await?;
    Ok(Json(logs))
}

// ============================================================================
// Entries
// ============================================================================

pub async fn list_production_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<EntryFilter>,
) -> AppResult<Json<Vec<ProductionEntry>>> {
    user.require(Resource::Production, Action::View)?;
    let entries = ProductionService::new(state.db.clone()).list_entries(filter).await?;
    Ok(Json(entries))
}

pub async fn get_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<ProductionEntry>> {
    user.require(Resource::Production, Action::View)?;
    let entry = ProductionService::new(state.db.clone()).get_entry(entry_id).await?;
    Ok(Json(entry))
}

pub async fn start_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<StartEntryInput>,
) -> AppResult<(StatusCode, Json<ProductionEntry>)> {
    user.require(Resource::Production, Action::Create)?;
    let entry = ProductionService::new(state.db.clone())
        .start_entry(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn complete_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<CompleteEntryInput>,
) -> AppResult<Json<ProductionEntry>> {
    user.require(Resource::Production, Action::Edit)?;
    let entry = ProductionService::new(state.db.clone())
        .complete_entry(entry_id, input)
        .await?;
    Ok(Json(entry))
}

pub async fn update_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<UpdateEntryInput>,
) -> AppResult<Json<ProductionEntry>> {
    user.require(Resource::Production, Action::Edit)?;
    let entry = ProductionService::new(state.db.clone())
        .update_entry(entry_id, input)
        .await?;
    Ok(Json(entry))
}

pub async fn approve_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<ProductionEntry>> {
    user.require(Resource::Production, Action::Approve)?;
    let entry = ProductionService::new(state.db.clone())
        .approve_entry(user.user_id, entry_id)
        .await?;
    Ok(Json(entry))
}

pub async fn reject_production_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<RejectEntryInput>,
) -> AppResult<Json<ProductionEntry>> {
    user.require(Resource::Production, Action::Approve)?;
    let entry = ProductionService::new(state.db.clone())
        .reject_entry(user.user_id, entry_id, input)
        .await?;
    Ok(Json(entry))
}

// ============================================================================
// Machines
// ============================================================================

pub async fn list_machines(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<MachineFilter>,
) -> AppResult<Json<Vec<Machine>>> {
    user.require(Resource::Machine, Action::View)?;
    let machines = ProductionService::new(state.db.clone()).list_machines(filter).await?;
    Ok(Json(machines))
}

pub async fn get_machine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(machine_id): Path<Uuid>,
) -> AppResult<Json<Machine>> {
    user.require(Resource::Machine, Action::View)?;
    let machine = ProductionService::new(state.db.clone()).get_machine(machine_id).await?;
    Ok(Json(machine))
}

pub async fn create_machine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<MachineInput>,
) -> AppResult<(StatusCode, Json<Machine>)> {
    user.require(Resource::Machine, Action::Create)?;
    let machine = ProductionService::new(state.db.clone()).create_machine(input).await?;
    Ok((StatusCode::CREATED, Json(machine)))
}

pub async fn update_machine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(machine_id): Path<Uuid>,
    Json(input): Json<MachineInput>,
) -> AppResult<Json<Machine>> {
    user.require(Resource::Machine, Action::Edit)?;
    let machine = ProductionService::new(state.db.clone())
        .update_machine(machine_id, input)
        .await?;
    Ok(Json(machine))
}

pub async fn delete_machine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(machine_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Machine, Action::Delete)?;
    ProductionService::new(state.db.clone()).delete_machine(machine_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
