//! Finished-goods sale HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::final_sale::{FinalProductSale, FinalSaleFilter, FinalSaleInput};
use crate::services::FinalSaleService;
use crate::AppState;

fn final_sale_service(state: &AppState) -> FinalSaleService {
    FinalSaleService::new(state.db.clone(), state.config.tax.gst_rate_percent)
}

pub async fn list_final_sales(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<FinalSaleFilter>,
) -> AppResult<Json<Vec<FinalProductSale>>> {
    user.require(Resource::Invoice, Action::View)?;
    let sales = final_sale_service(&state).list_final_sales(filter).await?;
    Ok(Json(sales))
}

pub async fn get_final_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<FinalProductSale>> {
    user.require(Resource::Invoice, Action::View)?;
    let sale = final_sale_service(&state).get_final_sale(sale_id).await?;
    Ok(Json(sale))
}

pub async fn create_final_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<FinalSaleInput>,
) -> AppResult<(StatusCode, Json<FinalProductSale>)> {
    user.require(Resource::Invoice, Action::Create)?;
    let sale = final_sale_service(&state)
        .create_final_sale(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn delete_final_sale(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Invoice, Action::Delete)?;
    final_sale_service(&state).delete_final_sale(sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
