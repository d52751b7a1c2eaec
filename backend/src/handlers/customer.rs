//! Customer HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::customer::{Customer, CustomerFilter, CustomerInput};
use crate::services::CustomerService;
use crate::AppState;

pub async fn list_customers(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<Json<Vec<Customer>>> {
    user.require(Resource::Customer, Action::View)?;
    let customers = CustomerService::new(state.db.clone()).list_customers(filter).await?;
    Ok(Json(customers))
}

pub async fn get_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    user.require(Resource::Customer, Action::View)?;
    let customer = CustomerService::new(state.db.clone()).get_customer(customer_id).await?;
    Ok(Json(customer))
}

pub async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    user.require(Resource::Customer, Action::Create)?;
    let customer = CustomerService::new(state.db.clone()).create_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> AppResult<Json<Customer>> {
    user.require(Resource::Customer, Action::Edit)?;
    let customer = CustomerService::new(state.db.clone())
        .update_customer(customer_id, input)
        .await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Resource::Customer, Action::Delete)?;
    CustomerService::new(state.db.clone()).delete_customer(customer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
