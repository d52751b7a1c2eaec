//! Customer order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{
    CreateOrderInput, Order, OrderDetail, OrderFilter, UpdateOrderInput, UpdateStatusInput,
};
use crate::services::OrderService;
use crate::AppState;

pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<Order>>> {
    user.require(Resource::Order, Action::View)?;
    let orders = OrderService::new(state.db.clone()).list_orders(filter).await?;
    Ok(Json(orders))
}

/// Get an order with its line items
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    user.require(Resource::Order, Action::View)?;
    let order = OrderService::new(state.db.clone()).get_order(order_id).await?;
    Ok(Json(order))
}

pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderDetail>)> {
    user.require(Resource::Order, Action::Create)?;
    let order = OrderService::new(state.db.clone())
        .create_order(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<Order>> {
    user.require(Resource::Order, Action::Edit)?;
    let order = OrderService::new(state.db.clone())
        .update_order(order_id, input)
        .await?;
    Ok(Json(order))
}

/// Manual status change (cancel, deliver)
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<Order>> {
    user.require(Resource::Order, Action::Edit)?;
    let order = OrderService::new(state.db.clone())
        .update_status(order_id, input.status)
        .await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Order, Action::Delete)?;
    OrderService::new(state.db.clone()).delete_order(order_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
