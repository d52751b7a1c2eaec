//! Point-of-sale HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Action, LineAmount, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::pos::{BillQuote, CreateSaleInput, PosSale, PosTransaction, RefundInput, SaleFilter};
use crate::services::PosService;
use crate::AppState;

#[derive(Deserialize)]
pub struct QuoteLine {
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub items: Vec<QuoteLine>,
    #[serde(default)]
    pub discount: Decimal,
}

fn pos_service(state: &AppState) -> PosService {
    PosService::new(state.db.clone(), state.config.tax.gst_rate_percent)
}

/// Price a basket with GST without recording a sale
pub async fn quote_bill(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<QuoteRequest>,
) -> AppResult<Json<BillQuote>> {
    user.require(Resource::Pos, Action::View)?;
    let lines: Vec<LineAmount> = body
        .items
        .iter()
        .map(|line| LineAmount::new(line.quantity, line.unit_price))
        .collect();
    let quote = pos_service(&state).quote(&lines, body.discount)?;
    Ok(Json(quote))
}

pub async fn create_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<PosSale>)> {
    user.require(Resource::Pos, Action::Create)?;
    let sale = pos_service(&state).create_sale(user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn list_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<SaleFilter>,
) -> AppResult<Json<Vec<PosTransaction>>> {
    user.require(Resource::Pos, Action::View)?;
    let sales = pos_service(&state).list_sales(filter).await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<PosSale>> {
    user.require(Resource::Pos, Action::View)?;
    let sale = pos_service(&state).get_sale(sale_id).await?;
    Ok(Json(sale))
}

/// Refunds need approval rights, not just till access
pub async fn refund_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<RefundInput>,
) -> AppResult<Json<PosSale>> {
    user.require(Resource::Pos, Action::Approve)?;
    let sale = pos_service(&state)
        .refund_sale(user.user_id, sale_id, input)
        .await?;
    Ok(Json(sale))
}
