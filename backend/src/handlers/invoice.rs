//! Invoice HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::invoice::{
    CreateInvoiceInput, Invoice, InvoiceDetail, InvoiceFilter, RecordPaymentInput,
};
use crate::services::InvoiceService;
use crate::AppState;

fn invoice_service(state: &AppState) -> InvoiceService {
    InvoiceService::new(state.db.clone(), &state.config.tax)
}

pub async fn list_invoices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(filter): Query<InvoiceFilter>,
) -> AppResult<Json<Vec<Invoice>>> {
    user.require(Resource::Invoice, Action::View)?;
    let invoices = invoice_service(&state).list_invoices(filter).await?;
    Ok(Json(invoices))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<InvoiceDetail>> {
    user.require(Resource::Invoice, Action::View)?;
    let invoice = invoice_service(&state).get_invoice(invoice_id).await?;
    Ok(Json(invoice))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateInvoiceInput>,
) -> AppResult<(StatusCode, Json<InvoiceDetail>)> {
    user.require(Resource::Invoice, Action::Create)?;
    let invoice = invoice_service(&state)
        .create_invoice(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn record_invoice_payment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invoice_id): Path<Uuid>,
    Json(input): Json<RecordPaymentInput>,
) -> AppResult<Json<Invoice>> {
    user.require(Resource::Invoice, Action::Edit)?;
    let invoice = invoice_service(&state)
        .record_payment(user.user_id, invoice_id, input)
        .await?;
    Ok(Json(invoice))
}

pub async fn cancel_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(invoice_id): Path<Uuid>,
) -> AppResult<Json<Invoice>> {
    user.require(Resource::Invoice, Action::Delete)?;
    let invoice = invoice_service(&state).cancel_invoice(invoice_id).await?;
    Ok(Json(invoice))
}
