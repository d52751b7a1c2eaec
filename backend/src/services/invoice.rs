//! GST invoicing service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    apply_invoice_payment, compute_gst, is_interstate_supply, round_money, sum_lines, DocumentKind,
    InvoiceStatus, LineAmount, LineError, ReferenceType,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::accounting::{check_range, post_reference_entry};
use super::sequence::next_document_number;
use crate::config::TaxConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct InvoiceService {
    db: PgPool,
    gst_rate_percent: Decimal,
    business_gstin: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Invoice {
    pub id: Uuid,
    pub invoice_number: String,
    pub order_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable_amount: Decimal,
    pub gst_rate: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_amount: Decimal,
    pub amount_paid: Decimal,
    pub status: String,
    pub interstate: bool,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
    pub balance_due: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemInput {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceInput {
    /// Bill an order; its customer and, when no items are given, its lines are used
    pub order_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<InvoiceItemInput>,
    #[serde(default)]
    pub discount: Decimal,
    /// Overrides the place-of-supply check against the customer's GSTIN
    pub interstate: Option<bool>,
    pub invoice_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentInput {
    pub amount: Decimal,
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const INVOICE_COLUMNS: &str = "id, invoice_number, order_id, customer_id, invoice_date, due_date, \
     subtotal, discount, taxable_amount, gst_rate, cgst, sgst, igst, total_amount, amount_paid, \
     status, interstate, notes, created_by, created_at, updated_at";

impl InvoiceService {
    pub fn new(db: PgPool, tax: &TaxConfig) -> Self {
        Self {
            db,
            gst_rate_percent: tax.gst_rate_percent,
            business_gstin: tax.business_gstin.clone(),
        }
    }

    pub async fn create_invoice(&self, user_id: Uuid, input: CreateInvoiceInput) -> AppResult<InvoiceDetail> {
        let mut tx = self.db.begin().await?;

        let (customer_id, items) = match input.order_id {
            Some(order_id) => {
                let order_customer =
                    sqlx::query_scalar::<_, Uuid>("SELECT customer_id FROM orders WHERE id = $1")
                        .bind(order_id)
                        .fetch_optional(&mut *tx)
                        .await?
                        .ok_or_else(|| AppError::validation("order_id", "Order does not exist"))?;

                if input.customer_id.is_some_and(|c| c != order_customer) {
                    return Err(AppError::validation(
                        "customer_id",
                        "Customer does not match the order",
                    ));
                }

                let items = if input.items.is_empty() {
                    sqlx::query_as::<_, (String, Decimal, Decimal)>(
                        "SELECT product_name, quantity, unit_price FROM order_items WHERE order_id = $1",
                    )
                    .bind(order_id)
                    .fetch_all(&mut *tx)
                    .await?
                    .into_iter()
                    .map(|(description, quantity, unit_price)| InvoiceItemInput {
                        description,
                        quantity,
                        unit_price,
                    })
                    .collect()
                } else {
                    input.items
                };
                (order_customer, items)
            }
            None => {
                let customer_id = input.customer_id.ok_or_else(|| {
                    AppError::validation("customer_id", "Either an order or a customer is required")
                })?;
                (customer_id, input.items)
            }
        };

        if let Some((i, _)) = items.iter().enumerate().find(|(_, item)| item.description.trim().is_empty()) {
            return Err(AppError::validation(
                "items",
                format!("Item {}: description is required", i + 1),
            ));
        }

        let lines: Vec<LineAmount> = items
            .iter()
            .map(|item| LineAmount::new(item.quantity, item.unit_price))
            .collect();
        let subtotal = sum_lines(&lines)?;
        let discount = round_money(input.discount);
        if discount < Decimal::ZERO || discount > subtotal {
            return Err(AppError::validation(
                "discount",
                "Discount must be between zero and the subtotal",
            ));
        }

        let customer_gstin =
            sqlx::query_scalar::<_, Option<String>>("SELECT gstin FROM customers WHERE id = $1")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::validation("customer_id", "Customer does not exist"))?;

        let interstate = input
            .interstate
            .unwrap_or_else(|| self.place_of_supply_differs(customer_gstin.as_deref()));
        let gst = compute_gst(subtotal - discount, self.gst_rate_percent, interstate);

        let invoice_date = input.invoice_date.unwrap_or_else(|| Utc::now().date_naive());
        if input.due_date.is_some_and(|due| due < invoice_date) {
            return Err(AppError::validation("due_date", "Due date cannot precede the invoice date"));
        }
        let number = next_document_number(&mut tx, DocumentKind::Invoice, invoice_date).await?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices
                (invoice_number, order_id, customer_id, invoice_date, due_date, subtotal, discount,
                 taxable_amount, gst_rate, cgst, sgst, igst, total_amount, status, interstate, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(number.to_string())
        .bind(input.order_id)
        .bind(customer_id)
        .bind(invoice_date)
        .bind(input.due_date)
        .bind(subtotal)
        .bind(discount)
        .bind(gst.taxable_amount)
        .bind(gst.rate_percent)
        .bind(gst.cgst)
        .bind(gst.sgst)
        .bind(gst.igst)
        .bind(gst.grand_total)
        .bind(InvoiceStatus::Unpaid.as_str())
        .bind(interstate)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(items.len());
        for (i, (item, line)) in items.iter().zip(&lines).enumerate() {
            let line_total = line.total().ok_or(LineError::Overflow(i + 1))?;
            let row = sqlx::query_as::<_, InvoiceItem>(
                r#"
                INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, invoice_id, description, quantity, unit_price, line_total
                "#,
            )
            .bind(invoice.id)
            .bind(item.description.trim())
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            invoice_number = %invoice.invoice_number,
            total = %invoice.total_amount,
            interstate = invoice.interstate,
            "Invoice created"
        );

        Ok(detail(invoice, rows))
    }

    /// Apply a customer payment and book it as income
    pub async fn record_payment(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: RecordPaymentInput,
    ) -> AppResult<Invoice> {
        let amount = round_money(input.amount);
        let mut tx = self.db.begin().await?;

        let current = self.lock_invoice(&mut tx, id).await?;
        let status = parse_status(&current.status)?;
        let (paid, new_status) =
            apply_invoice_payment(status, current.total_amount, current.amount_paid, amount)?;

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE invoices SET amount_paid = $2, status = $3 WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(id)
        .bind(paid)
        .bind(new_status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        post_reference_entry(
            &mut tx,
            ReferenceType::InvoicePayment,
            id,
            amount,
            input.payment_date.unwrap_or_else(|| Utc::now().date_naive()),
            format!("Payment against invoice {}", invoice.invoice_number),
            user_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(invoice_number = %invoice.invoice_number, amount = %amount, status = %invoice.status, "Invoice payment recorded");
        Ok(invoice)
    }

    /// Cancel an invoice that has not received any payment
    pub async fn cancel_invoice(&self, id: Uuid) -> AppResult<Invoice> {
        let mut tx = self.db.begin().await?;

        let current = self.lock_invoice(&mut tx, id).await?;
        if current.status == InvoiceStatus::Cancelled.as_str() {
            return Err(AppError::InvalidStateTransition("Invoice is already cancelled".to_string()));
        }
        if current.amount_paid > Decimal::ZERO {
            return Err(AppError::InvalidStateTransition(format!(
                "Invoice {} has payments of {} and cannot be cancelled",
                current.invoice_number, current.amount_paid
            )));
        }

        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "UPDATE invoices SET status = $2 WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(id)
        .bind(InvoiceStatus::Cancelled.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(invoice_number = %invoice.invoice_number, "Invoice cancelled");
        Ok(invoice)
    }

    pub async fn get_invoice(&self, id: Uuid) -> AppResult<InvoiceDetail> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice"))?;

        let items = sqlx::query_as::<_, InvoiceItem>(
            r#"
            SELECT id, invoice_id, description, quantity, unit_price, line_total
            FROM invoice_items
            WHERE invoice_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(detail(invoice, items))
    }

    pub async fn list_invoices(&self, filter: InvoiceFilter) -> AppResult<Vec<Invoice>> {
        check_range(filter.start_date, filter.end_date)?;

        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices
            WHERE ($1::varchar IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::date IS NULL OR invoice_date >= $3)
              AND ($4::date IS NULL OR invoice_date <= $4)
            ORDER BY invoice_date DESC, invoice_number DESC
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.customer_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(invoices)
    }

    async fn lock_invoice(&self, conn: &mut sqlx::PgConnection, id: Uuid) -> AppResult<Invoice> {
        sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice"))
    }

    /// Inter-state when both parties are GST-registered in different states
    fn place_of_supply_differs(&self, customer_gstin: Option<&str>) -> bool {
        match (self.business_gstin.as_deref(), customer_gstin) {
            (Some(ours), Some(theirs)) => is_interstate_supply(ours, theirs),
            _ => false,
        }
    }
}

fn detail(invoice: Invoice, items: Vec<InvoiceItem>) -> InvoiceDetail {
    let balance_due = invoice.total_amount - invoice.amount_paid;
    InvoiceDetail {
        invoice,
        items,
        balance_due,
    }
}

fn parse_status(status: &str) -> AppResult<InvoiceStatus> {
    InvoiceStatus::parse(status)
        .ok_or_else(|| AppError::Internal(format!("Unknown invoice status {}", status)))
}
