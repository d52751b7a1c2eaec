//! Store, inventory and stock transfer HTTP handlers

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
use crate::services::store::{
    AdjustInventoryInput, InventoryItem, StockTransfer, Store, StoreInput, TransferFilter,
    TransferInput, UpsertInventoryInput,
};
use crate::services::StoreService;
use crate::AppState;

pub async fn list_stores(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<BranchQuery>,
) -> AppResult<Json<Vec<Store>>> {
    user.require(Resource::Store, Action::View)?;
    let stores = StoreService::new(state.db.clone()).list_stores(query.branch_id).await?;
    Ok(Json(stores))
}

pub async fn get_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Store>> {
    user.require(Resource::Store, Action::View)?;
    let store = StoreService::new(state.db.clone()).get_store(store_id).await?;
    Ok(Json(store))
}

pub async fn create_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<StoreInput>,
) -> AppResult<(StatusCode, Json<Store>)> {
    user.require(Resource::Store, Action::Create)?;
    let store = StoreService::new(state.db.clone()).create_store(input).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn update_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
    Json(input): Json<StoreInput>,
) -> AppResult<Json<Store>> {
    user.require(Resource::Store, Action::Edit)?;
    let store = StoreService::new(state.db.clone()).update_store(store_id, input).await?;
    Ok(Json(store))
}

pub async fn delete_store(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Store, Action::Delete)?;
    StoreService::new(state.db.clone()).delete_store(store_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Inventory
// ============================================================================

pub async fn list_store_inventory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    user.require(Resource::Store, Action::View)?;
    let items = StoreService::new(state.db.clone()).list_inventory(store_id).await?;
    Ok(Json(items))
}

/// Create or restock a product line in a store
pub async fn upsert_store_inventory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(store_id): Path<Uuid>,
    Json(input): Json<UpsertInventoryInput>,
) -> AppResult<Json<InventoryItem>> {
    user.require(Resource::Store, Action::Edit)?;
    let item = StoreService::new(state.db.clone())
        .upsert_inventory(store_id, input)
        .await?;
    Ok(Json(item))
}

pub async fn adjust_store_inventory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<AdjustInventoryInput>,
) -> AppResult<Json<InventoryItem>> {
    user.require(Resource::Store, Action::Edit)?;
    let item = StoreService::new(state.db.clone())
        .adjust_inventory(item_id, input)
        .await?;
    Ok(Json(item))
}

pub async fn delete_store_inventory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Store, Action::Delete)?;
    StoreService::new(state.db.clone()).delete_inventory(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Transfers
// ============================================================================

pub async fn create_stock_transfer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<(StatusCode, Json<StockTransfer>)> {
    user.require(Resource::Store, Action::Edit)?;
    let transfer = StoreService::new(state.db.clone())
        .create_transfer(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

pub async fn list_stock_transfers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<TransferFilter>,
) -> AppResult<Json<Vec<StockTransfer>>> {
    user.require(Resource::Store, Action::View)?;
    let transfers = StoreService::new(state.db.clone()).list_transfers(filter).await?;
    Ok(Json(transfers))
}
