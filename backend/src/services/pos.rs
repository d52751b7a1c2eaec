//! Point-of-sale service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    compute_bill, settle_payments, BillTotals, DocumentKind, LineAmount, LineError, PaymentMethod,
    PosStatus, ReferenceType, Settlement,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::accounting::{check_range, post_reference_entry};
use super::sequence::next_document_number;
use super::store::{decrement_inventory, increment_inventory};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct PosService {
    db: PgPool,
    gst_rate_percent: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PosTransaction {
    pub id: Uuid,
    pub bill_number: String,
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub change_given: Decimal,
    pub status: String,
    pub refund_reason: Option<String>,
    pub refunded_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PosItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub inventory_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PosPayment {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub method: String,
    pub amount: Decimal,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bill with its lines and payments
#[derive(Debug, Clone, Serialize)]
pub struct PosSale {
    #[serde(flatten)]
    pub transaction: PosTransaction,
    pub items: Vec<PosItem>,
    pub payments: Vec<PosPayment>,
}

#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub inventory_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub store_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub items: Vec<SaleItemInput>,
    pub payments: Vec<PaymentInput>,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RefundInput {
    pub reason: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleFilter {
    pub store_id: Option<Uuid>,
    pub status: Option<PosStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Totals a client can show before submitting a sale
#[derive(Debug, Clone, Serialize)]
pub struct BillQuote {
    #[serde(flatten)]
    pub totals: BillTotals,
    pub gst_rate_percent: Decimal,
}

#[derive(Debug, FromRow)]
struct PricedLine {
    id: Uuid,
    product_name: String,
    unit_price: Decimal,
}

const TRANSACTION_COLUMNS: &str = "id, bill_number, store_id, customer_id, subtotal, discount, \
     tax_amount, total_amount, amount_paid, change_given, status, refund_reason, refunded_at, \
     created_by, created_at";

impl PosService {
    pub fn new(db: PgPool, gst_rate_percent: Decimal) -> Self {
        Self {
            db,
            gst_rate_percent,
        }
    }

    /// Ring up a sale: inventory, payments and the income entry commit together
    pub async fn create_sale(&self, user_id: Uuid, input: CreateSaleInput) -> AppResult<PosSale> {
        let mut tx = self.db.begin().await?;

        let ids: Vec<Uuid> = input.items.iter().map(|i| i.inventory_id).collect();
        let priced = sqlx::query_as::<_, PricedLine>(
            r#"
            SELECT id, product_name, unit_price
            FROM store_inventory
            WHERE store_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(input.store_id)
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(input.items.len());
        let mut resolved = Vec::with_capacity(input.items.len());
        for (i, item) in input.items.iter().enumerate() {
            let line = priced.iter().find(|p| p.id == item.inventory_id).ok_or_else(|| {
                AppError::validation(
                    "items",
                    format!("Item {}: product is not stocked at this store", i + 1),
                )
            })?;
            lines.push(LineAmount::new(item.quantity, line.unit_price));
            resolved.push(line);
        }

        let totals = compute_bill(&lines, input.discount, self.gst_rate_percent)?;
        let tendered: Vec<(PaymentMethod, Decimal)> =
            input.payments.iter().map(|p| (p.method, p.amount)).collect();
        let Settlement {
            amount_paid,
            change_given,
        } = settle_payments(totals.total, &tendered)?;

        let today = Utc::now().date_naive();
        let number = next_document_number(&mut tx, DocumentKind::Bill, today).await?;

        let transaction = sqlx::query_as::<_, PosTransaction>(&format!(
            r#"
            INSERT INTO pos_transactions
                (bill_number, store_id, customer_id, subtotal, discount, tax_amount, total_amount,
                 amount_paid, change_given, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(number.to_string())
        .bind(input.store_id)
        .bind(input.customer_id)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.tax_amount)
        .bind(totals.total)
        .bind(amount_paid)
        .bind(change_given)
        .bind(PosStatus::Completed.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for (i, (line, stock)) in lines.iter().zip(resolved).enumerate() {
            let line_total = line.total().ok_or(LineError::Overflow(i + 1))?;
            decrement_inventory(&mut tx, stock.id, line.quantity).await?;

            let item = sqlx::query_as::<_, PosItem>(
                r#"
                INSERT INTO pos_items (transaction_id, inventory_id, product_name, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, transaction_id, inventory_id, product_name, quantity, unit_price, line_total
                "#,
            )
            .bind(transaction.id)
            .bind(stock.id)
            .bind(&stock.product_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        let mut payments = Vec::with_capacity(input.payments.len());
        for payment in &input.payments {
            let row = sqlx::query_as::<_, PosPayment>(
                r#"
                INSERT INTO pos_payments (transaction_id, method, amount, reference)
                VALUES ($1, $2, $3, $4)
                RETURNING id, transaction_id, method, amount, reference, created_at
                "#,
            )
            .bind(transaction.id)
            .bind(payment.method.as_str())
            .bind(payment.amount)
            .bind(&payment.reference)
            .fetch_one(&mut *tx)
            .await?;
            payments.push(row);
        }

        post_reference_entry(
            &mut tx,
            ReferenceType::PosTransaction,
            transaction.id,
            totals.total,
            today,
            format!("POS sale {}", transaction.bill_number),
            user_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            bill_number = %transaction.bill_number,
            store_id = %transaction.store_id,
            total = %transaction.total_amount,
            "POS sale completed"
        );

        Ok(PosSale {
            transaction,
            items,
            payments,
        })
    }

    /// Reverse a completed sale: stock goes back and a refund expense is booked
    pub async fn refund_sale(&self, user_id: Uuid, id: Uuid, input: RefundInput) -> AppResult<PosSale> {
        let reason = input.reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("reason", "Refund reason is required"));
        }

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, PosTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM pos_transactions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("POS transaction"))?;

        if current.status != PosStatus::Completed.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Bill {} is {} and cannot be refunded",
                current.bill_number, current.status
            )));
        }

        let items = self.items_of(&mut tx, id).await?;
        for item in &items {
            increment_inventory(&mut tx, item.inventory_id, item.quantity).await?;
        }

        let transaction = sqlx::query_as::<_, PosTransaction>(&format!(
            r#"
            UPDATE pos_transactions
            SET status = $2, refund_reason = $3, refunded_at = NOW()
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(PosStatus::Refunded.as_str())
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        post_reference_entry(
            &mut tx,
            ReferenceType::PosRefund,
            id,
            transaction.total_amount,
            Utc::now().date_naive(),
            format!("Refund of POS sale {}: {}", transaction.bill_number, reason),
            user_id,
        )
        .await?;

        let payments = self.payments_of(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(bill_number = %transaction.bill_number, "POS sale refunded");

        Ok(PosSale {
            transaction,
            items,
            payments,
        })
    }

    pub async fn get_sale(&self, id: Uuid) -> AppResult<PosSale> {
        let mut conn = self.db.acquire().await?;

        let transaction = sqlx::query_as::<_, PosTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM pos_transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("POS transaction"))?;

        let items = self.items_of(&mut conn, id).await?;
        let payments = self.payments_of(&mut conn, id).await?;

        Ok(PosSale {
            transaction,
            items,
            payments,
        })
    }

    pub async fn list_sales(&self, filter: SaleFilter) -> AppResult<Vec<PosTransaction>> {
        check_range(filter.start_date, filter.end_date)?;

        let sales = sqlx::query_as::<_, PosTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM pos_transactions
            WHERE ($1::uuid IS NULL OR store_id = $1)
              AND ($2::varchar IS NULL OR status = $2)
              AND ($3::date IS NULL OR created_at::date >= $3)
              AND ($4::date IS NULL OR created_at::date <= $4)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.store_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    /// Price a basket without touching stock
    pub fn quote(&self, lines: &[LineAmount], discount: Decimal) -> AppResult<BillQuote> {
        Ok(BillQuote {
            totals: compute_bill(lines, discount, self.gst_rate_percent)?,
            gst_rate_percent: self.gst_rate_percent,
        })
    }

    async fn items_of(&self, conn: &mut sqlx::PgConnection, id: Uuid) -> AppResult<Vec<PosItem>> {
        let items = sqlx::query_as::<_, PosItem>(
            r#"
            SELECT id, transaction_id, inventory_id, product_name, quantity, unit_price, line_total
            FROM pos_items
            WHERE transaction_id = $1
            ORDER BY product_name
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    async fn payments_of(&self, conn: &mut sqlx::PgConnection, id: Uuid) -> AppResult<Vec<PosPayment>> {
        let payments = sqlx::query_as::<_, PosPayment>(
            r#"
            SELECT id, transaction_id, method, amount, reference, created_at
            FROM pos_payments
            WHERE transaction_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(payments)
    }
}
