//! Reporting handlers for analytics and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{Action, Resource};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardMetrics, ReportFilter};
use crate::services::{AccountingService, ReportingService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub store_id: Option<Uuid>,
    pub format: Option<String>, // "json" or "csv"
}

impl ReportQuery {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            store_id: self.store_id,
        }
    }

    fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

fn render<T: Serialize>(rows: Vec<T>, csv: bool, filename: &str) -> AppResult<Response> {
    if csv {
        let body = ReportingService::export_to_csv(&rows)?;
        let disposition = format!("attachment; filename=\"{}.csv\"", filename);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}

/// Get dashboard metrics
pub async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    user.require(Resource::Report, Action::View)?;
    let metrics = ReportingService::new(state.db.clone()).dashboard_metrics().await?;
    Ok(Json(metrics))
}

pub async fn get_sales_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    user.require(Resource::Report, Action::View)?;
    let rows = ReportingService::new(state.db.clone())
        .sales_by_day(&query.filter())
        .await?;
    render(rows, query.wants_csv(), "sales_by_day")
}

pub async fn get_production_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    user.require(Resource::Report, Action::View)?;
    let rows = ReportingService::new(state.db.clone())
        .production_by_stage(&query.filter())
        .await?;
    render(rows, query.wants_csv(), "production_by_stage")
}

pub async fn get_low_stock_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    user.require(Resource::Report, Action::View)?;
    let rows = ReportingService::new(state.db.clone()).low_stock().await?;
    render(rows, query.wants_csv(), "low_stock")
}

/// Profit & loss; the CSV form lists the per-category totals
pub async fn get_profit_and_loss_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    user.require(Resource::Report, Action::View)?;
    let report = AccountingService::new(state.db.clone())
        .profit_and_loss(query.start_date, query.end_date)
        .await?;

    if query.wants_csv() {
        render(report.categories, true, "profit_and_loss")
    } else {
        Ok(Json(report).into_response())
    }
}
