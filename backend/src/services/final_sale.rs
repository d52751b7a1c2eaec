//! Sales of finished products from completed orders

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{compute_gst, LineAmount, OrderStatus, ReferenceType};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::accounting::{check_range, post_reference_entry, remove_reference_entries};
use super::order::parse_status;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct FinalSaleService {
    db: PgPool,
    gst_rate_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FinalProductSale {
    pub id: Uuid,
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub sale_date: NaiveDate,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct FinalSaleInput {
    pub order_id: Uuid,
    /// Defaults to the order's customer
    pub customer_id: Option<Uuid>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub sale_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinalSaleFilter {
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const SALE_COLUMNS: &str = "id, order_id, customer_id, quantity, unit_price, subtotal, tax_amount, \
     total_amount, sale_date, notes, created_by, created_at";

impl FinalSaleService {
    pub fn new(db: PgPool, gst_rate_percent: Decimal) -> Self {
        Self { db, gst_rate_percent }
    }

    pub async fn create_final_sale(&self, user_id: Uuid, input: FinalSaleInput) -> AppResult<FinalProductSale> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::validation("quantity", "Quantity must be greater than zero"));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(AppError::validation("unit_price", "Unit price cannot be negative"));
        }
        let subtotal = LineAmount::new(input.quantity, input.unit_price)
            .total()
            .ok_or_else(|| AppError::validation("unit_price", "Sale amount is too large"))?;

        let mut tx = self.db.begin().await?;

        // Lock the order so concurrent sales see each other's quantities
        let (order_number, status, order_customer) = sqlx::query_as::<_, (String, String, Uuid)>(
            "SELECT order_number, status, customer_id FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(input.order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

        if parse_status(&status)? != OrderStatus::Completed {
            return Err(AppError::InvalidStateTransition(format!(
                "Order {} is {} and has no finished products to sell",
                order_number, status
            )));
        }

        let (ordered, sold) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT
                COALESCE((SELECT SUM(quantity) FROM order_items WHERE order_id = $1), 0),
                COALESCE((SELECT SUM(quantity) FROM final_product_sales WHERE order_id = $1), 0)
            "#,
        )
        .bind(input.order_id)
        .fetch_one(&mut *tx)
        .await?;

        let remaining = ordered - sold;
        if input.quantity > remaining {
            return Err(AppError::InsufficientStock(format!(
                "Order {} has {} units left to sell, requested {}",
                order_number, remaining, input.quantity
            )));
        }

        let gst = compute_gst(subtotal, self.gst_rate_percent, false);
        let sale_date = input.sale_date.unwrap_or_else(|| Utc::now().date_naive());

        let sale = sqlx::query_as::<_, FinalProductSale>(&format!(
            r#"
            INSERT INTO final_product_sales
                (order_id, customer_id, quantity, unit_price, subtotal, tax_amount, total_amount, sale_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(input.order_id)
        .bind(input.customer_id.unwrap_or(order_customer))
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(subtotal)
        .bind(gst.total_tax)
        .bind(gst.grand_total)
        .bind(sale_date)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        post_reference_entry(
            &mut tx,
            ReferenceType::FinalProductSale,
            sale.id,
            sale.total_amount,
            sale_date,
            format!("Finished goods sale for order {}", order_number),
            user_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(sale_id = %sale.id, order = %order_number, quantity = %sale.quantity, "Final product sale recorded");
        Ok(sale)
    }

    pub async fn get_final_sale(&self, id: Uuid) -> AppResult<FinalProductSale> {
        sqlx::query_as::<_, FinalProductSale>(&format!(
            "SELECT {SALE_COLUMNS} FROM final_product_sales WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Final product sale"))
    }

    pub async fn list_final_sales(&self, filter: FinalSaleFilter) -> AppResult<Vec<FinalProductSale>> {
        check_range(filter.start_date, filter.end_date)?;

        let sales = sqlx::query_as::<_, FinalProductSale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM final_product_sales
            WHERE ($1::uuid IS NULL OR order_id = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::date IS NULL OR sale_date >= $3)
              AND ($4::date IS NULL OR sale_date <= $4)
            ORDER BY sale_date DESC, created_at DESC
            "#
        ))
        .bind(filter.order_id)
        .bind(filter.customer_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    /// Delete a sale together with its ledger entry
    pub async fn delete_final_sale(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let deleted = sqlx::query("DELETE FROM final_product_sales WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Err(AppError::not_found("Final product sale"));
        }

        remove_reference_entries(&mut tx, ReferenceType::FinalProductSale, id).await?;
        tx.commit().await?;

        tracing::info!(sale_id = %id, "Final product sale deleted");
        Ok(())
    }
}
