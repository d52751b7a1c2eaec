//! Reporting service for analytics and data export
//! Provides sales, production, stock and profit & loss summaries

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{EntryStatus, InvoiceStatus, OrderStatus, PosStatus, ProfitAndLoss};
use sqlx::PgPool;
use uuid::Uuid;

use super::accounting::{check_range, AccountingService};
use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Completed POS sales for one day
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub sale_date: NaiveDate,
    pub bill_count: i64,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Production totals for one stage
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StageProduction {
    pub stage: String,
    pub entry_count: i64,
    pub input_quantity: i64,
    pub output_quantity: i64,
    pub rejected_quantity: i64,
    pub avg_wastage_percent: Option<Decimal>,
}

/// Raw material at or below its reorder level
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LowStockLine {
    pub material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub reorder_level: Decimal,
    pub shortfall: Decimal,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub pending_orders: i64,
    pub orders_in_production: i64,
    pub completed_orders: i64,
    pub entries_awaiting_approval: i64,
    pub low_stock_materials: i64,
    pub todays_sales: Decimal,
    pub todays_bills: i64,
    pub outstanding_receivables: Decimal,
    pub month_to_date: ProfitAndLoss,
}

/// Report filter parameters
#[derive(Debug, Default, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub store_id: Option<Uuid>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Completed POS sales grouped by day
    pub async fn sales_by_day(&self, filter: &ReportFilter) -> AppResult<Vec<DailySales>> {
        check_range(filter.start_date, filter.end_date)?;

        let rows = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT
                created_at::date AS sale_date,
                COUNT(*) AS bill_count,
                COALESCE(SUM(subtotal), 0) AS subtotal,
                COALESCE(SUM(discount), 0) AS discount,
                COALESCE(SUM(tax_amount), 0) AS tax_amount,
                COALESCE(SUM(total_amount), 0) AS total_amount
            FROM pos_transactions
            WHERE status = $1
              AND ($2::uuid IS NULL OR store_id = $2)
              AND ($3::date IS NULL OR created_at::date >= $3)
              AND ($4::date IS NULL OR created_at::date <= $4)
            GROUP BY created_at::date
            ORDER BY sale_date
            "#,
        )
        .bind(PosStatus::Completed.as_str())
        .bind(filter.store_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Finished production entries grouped by stage
    pub async fn production_by_stage(&self, filter: &ReportFilter) -> AppResult<Vec<StageProduction>> {
        check_range(filter.start_date, filter.end_date)?;

        let rows = sqlx::query_as::<_, StageProduction>(
            r#"
            SELECT
                stage,
                COUNT(*) AS entry_count,
                COALESCE(SUM(input_quantity), 0)::bigint AS input_quantity,
                COALESCE(SUM(output_quantity), 0)::bigint AS output_quantity,
                COALESCE(SUM(rejected_quantity), 0)::bigint AS rejected_quantity,
                ROUND(AVG(wastage_percent), 2) AS avg_wastage_percent
            FROM production_entries
            WHERE status IN ($1, $2)
              AND ($3::date IS NULL OR start_time::date >= $3)
              AND ($4::date IS NULL OR start_time::date <= $4)
            GROUP BY stage
            "#,
        )
        .bind(EntryStatus::Completed.as_str())
        .bind(EntryStatus::Approved.as_str())
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        // Pipeline order rather than alphabetical
        let mut rows = rows;
        rows.sort_by_key(|row| {
            row.stage
                .parse::<shared::ProductionStage>()
                .map(|stage| stage.index())
                .unwrap_or(usize::MAX)
        });

        Ok(rows)
    }

    pub async fn low_stock(&self) -> AppResult<Vec<LowStockLine>> {
        let rows = sqlx::query_as::<_, LowStockLine>(
            r#"
            SELECT id AS material_id, name, unit, quantity, reorder_level,
                   reorder_level - quantity AS shortfall
            FROM raw_materials
            WHERE quantity <= reorder_level
            ORDER BY shortfall DESC, name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Get dashboard metrics
    pub async fn dashboard_metrics(&self) -> AppResult<DashboardMetrics> {
        let (pending_orders, orders_in_production, completed_orders): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE status = $1),
                    COUNT(*) FILTER (WHERE status = $2),
                    COUNT(*) FILTER (WHERE status = $3)
                FROM orders
                "#,
            )
            .bind(OrderStatus::Pending.as_str())
            .bind(OrderStatus::InProduction.as_str())
            .bind(OrderStatus::Completed.as_str())
            .fetch_one(&self.db)
            .await?;

        let entries_awaiting_approval: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM production_entries WHERE status = $1")
                .bind(EntryStatus::Completed.as_str())
                .fetch_one(&self.db)
                .await?;

        let low_stock_materials: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM raw_materials WHERE quantity <= reorder_level")
                .fetch_one(&self.db)
                .await?;

        let today = Utc::now().date_naive();
        let (todays_bills, todays_sales): (i64, Decimal) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM pos_transactions
            WHERE status = $1 AND created_at::date = $2
            "#,
        )
        .bind(PosStatus::Completed.as_str())
        .bind(today)
        .fetch_one(&self.db)
        .await?;

        let outstanding_receivables: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount - amount_paid), 0)
            FROM invoices
            WHERE status IN ($1, $2)
            "#,
        )
        .bind(InvoiceStatus::Unpaid.as_str())
        .bind(InvoiceStatus::PartiallyPaid.as_str())
        .fetch_one(&self.db)
        .await?;

        let month_start = today.with_day(1).ok_or_else(|| {
            AppError::Internal(format!("Cannot compute start of month for {}", today))
        })?;
        let month_to_date = AccountingService::new(self.db.clone())
            .profit_and_loss(Some(month_start), Some(today))
            .await?
            .totals;

        Ok(DashboardMetrics {
            pending_orders,
            orders_in_production,
            completed_orders,
            entries_awaiting_approval,
            low_stock_materials,
            todays_sales,
            todays_bills,
            outstanding_receivables,
            month_to_date,
        })
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_export_writes_header_and_rows() {
        let rows = vec![LowStockLine {
            material_id: Uuid::nil(),
            name: "MS Sheet 2mm".to_string(),
            unit: "SHEET".to_string(),
            quantity: Decimal::from(4),
            reorder_level: Decimal::from(10),
            shortfall: Decimal::from(6),
        }];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("material_id,name,unit,quantity,reorder_level,shortfall")
        );
        assert!(lines.next().unwrap().contains("MS Sheet 2mm,SHEET,4,10,6"));
    }

    #[test]
    fn csv_export_of_nothing_is_empty() {
        let rows: Vec<DailySales> = Vec::new();
        assert_eq!(ReportingService::export_to_csv(&rows).unwrap(), "");
    }
}
