//! Accounting ledger HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use super::PeriodQuery;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::accounting::{AccountingEntry, EntryFilter, ManualEntryInput, ProfitAndLossReport};
use crate::services::AccountingService;
use crate::AppState;

pub async fn list_accounting_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<EntryFilter>,
) -> AppResult<Json<Vec<AccountingEntry>>> {
    user.require(Resource::Accounting, Action::View)?;
    let entries = AccountingService::new(state.db.clone()).list_entries(filter).await?;
    Ok(Json(entries))
}

pub async fn get_accounting_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<AccountingEntry>> {
    user.require(Resource::Accounting, Action::View)?;
    let entry = AccountingService::new(state.db.clone()).get_entry(entry_id).await?;
    Ok(Json(entry))
}

pub async fn create_accounting_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<ManualEntryInput>,
) -> AppResult<(StatusCode, Json<AccountingEntry>)> {
    user.require(Resource::Accounting, Action::Create)?;
    let entry = AccountingService::new(state.db.clone())
        .create_entry(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_accounting_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<ManualEntryInput>,
) -> AppResult<Json<AccountingEntry>> {
    user.require(Resource::Accounting, Action::Edit)?;
    let entry = AccountingService::new(state.db.clone())
        .update_entry(entry_id, input)
        .await?;
    Ok(Json(entry))
}

pub async fn delete_accounting_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(entry_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Accounting, Action::Delete)?;
    AccountingService::new(state.db.clone()).delete_entry(entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_profit_and_loss(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<ProfitAndLossReport>> {
    user.require(Resource::Accounting, Action::View)?;
    let report = AccountingService::new(state.db.clone())
        .profit_and_loss(period.start_date, period.end_date)
        .await?;
    Ok(Json(report))
}
