//! Raw material, seller, purchase and usage HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::material::{
    MaterialUsage, MovementFilter, Purchase, PurchaseInput, RawMaterial, RawMaterialInput, Seller,
    SellerInput, UsageInput,
};
use crate::services::MaterialService;
use crate::AppState;

// ============================================================================
// Raw materials
// ============================================================================

pub async fn list_materials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<RawMaterial>>> {
    user.require(Resource::Material, Action::View)?;
    let materials = MaterialService::new(state.db.clone()).list_materials().await?;
    Ok(Json(materials))
}

/// Materials at or below their reorder level
pub async fn list_low_stock_materials(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<RawMaterial>>> {
    user.require(Resource::Material, Action::View)?;
    let materials = MaterialService::new(state.db.clone()).low_stock_materials().await?;
    Ok(Json(materials))
}

pub async fn get_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<RawMaterial>> {
    user.require(Resource::Material, Action::View)?;
    let material = MaterialService::new(state.db.clone()).get_material(material_id).await?;
    Ok(Json(material))
}

pub async fn create_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<RawMaterialInput>,
) -> AppResult<(StatusCode, Json<RawMaterial>)> {
    user.require(Resource::Material, Action::Create)?;
    let material = MaterialService::new(state.db.clone()).create_material(input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<Uuid>,
    Json(input): Json<RawMaterialInput>,
) -> AppResult<Json<RawMaterial>> {
    user.require(Resource::Material, Action::Edit)?;
    let material = MaterialService::new(state.db.clone())
        .update_material(material_id, input)
        .await?;
    Ok(Json(material))
}

pub async fn delete_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Material, Action::Delete)?;
    MaterialService::new(state.db.clone()).delete_material(material_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Sellers
// ============================================================================

pub async fn list_sellers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Seller>>> {
    user.require(Resource::Material, Action::View)?;
    let sellers = MaterialService::new(state.db.clone()).list_sellers().await?;
    Ok(Json(sellers))
}

pub async fn get_seller(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(seller_id): Path<Uuid>,
) -> AppResult<Json<Seller>> {
    user.require(Resource::Material, Action::View)?;
    let seller = MaterialService::new(state.db.clone()).get_seller(seller_id).await?;
    Ok(Json(seller))
}

pub async fn create_seller(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<SellerInput>,
) -> AppResult<(StatusCode, Json<Seller>)> {
    user.require(Resource::Material, Action::Create)?;
    let seller = MaterialService::new(state.db.clone()).create_seller(input).await?;
    Ok((StatusCode::CREATED, Json(seller)))
}

pub async fn update_seller(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(seller_id): Path<Uuid>,
    Json(input): Json<SellerInput>,
) -> AppResult<Json<Seller>> {
    user.require(Resource::Material, Action::Edit)?;
    let seller = MaterialService::new(state.db.clone())
        .update_seller(seller_id, input)
        .await?;
    Ok(Json(seller))
}

pub async fn delete_seller(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(seller_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Material, Action::Delete)?;
    MaterialService::new(state.db.clone()).delete_seller(seller_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Purchases
// ============================================================================

pub async fn list_purchases(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<Purchase>>> {
    user.require(Resource::Material, Action::View)?;
    let purchases = MaterialService::new(state.db.clone()).list_purchases(filter).await?;
    Ok(Json(purchases))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<Purchase>> {
    user.require(Resource::Material, Action::View)?;
    let purchase = MaterialService::new(state.db.clone()).get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// Receive stock from a seller; books the expense
pub async fn create_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<PurchaseInput>,
) -> AppResult<(StatusCode, Json<Purchase>)> {
    user.require(Resource::Material, Action::Create)?;
    let purchase = MaterialService::new(state.db.clone())
        .create_purchase(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn update_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<PurchaseInput>,
) -> AppResult<Json<Purchase>> {
    user.require(Resource::Material, Action::Edit)?;
    let purchase = MaterialService::new(state.db.clone())
        .update_purchase(user.user_id, purchase_id, input)
        .await?;
    Ok(Json(purchase))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Material, Action::Delete)?;
    MaterialService::new(state.db.clone()).delete_purchase(purchase_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Usages
// ============================================================================

pub async fn list_usages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<MaterialUsage>>> {
    user.require(Resource::Material, Action::View)?;
    let usages = MaterialService::new(state.db.clone()).list_usages(filter).await?;
    Ok(Json(usages))
}

pub async fn create_usage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<UsageInput>,
) -> AppResult<(StatusCode, Json<MaterialUsage>)> {
    user.require(Resource::Material, Action::Create)?;
    let usage = MaterialService::new(state.db.clone())
        .create_usage(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(usage)))
}

pub async fn update_usage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(usage_id): Path<Uuid>,
    Json(input): Json<UsageInput>,
) -> AppResult<Json<MaterialUsage>> {
    user.require(Resource::Material, Action::Edit)?;
    let usage = MaterialService::new(state.db.clone())
        .update_usage(usage_id, input)
        .await?;
    Ok(Json(usage))
}

pub async fn delete_usage(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(usage_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Material, Action::Delete)?;
    MaterialService::new(state.db.clone()).delete_usage(usage_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
