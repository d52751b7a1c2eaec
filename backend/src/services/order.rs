//! Order intake service

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{sum_lines, DocumentKind, LineAmount, LineError, OrderStatus};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::sequence::next_document_number;
use crate::error::{AppError, AppResult};

/// Order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub status: String,
    pub current_stage: String,
    pub total_amount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Order with its line items
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderItemInput {
    #[validate(length(min = 1, max = 160, message = "Product name is required"))]
    pub product_name: String,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub branch_id: Option<Uuid>,
    #[validate]
    pub items: Vec<OrderItemInput>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderInput {
    pub customer_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, branch_id, status, current_stage, \
     total_amount, due_date, notes, created_by, created_at, updated_at";

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order with its items and a fresh ORD number
    pub async fn create_order(&self, user_id: Uuid, input: CreateOrderInput) -> AppResult<OrderDetail> {
        input.validate()?;

        let lines: Vec<LineAmount> = input
            .items
            .iter()
            .map(|item| LineAmount::new(item.quantity, item.unit_price))
            .collect();
        let total = sum_lines(&lines)?;

        let customer_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(input.customer_id)
                .fetch_one(&self.db)
                .await?;
        if !customer_exists {
            return Err(AppError::validation("customer_id", "Customer does not exist"));
        }
        if let Some(branch_id) = input.branch_id {
            let branch_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM branches WHERE id = $1)")
                    .bind(branch_id)
                    .fetch_one(&self.db)
                    .await?;
            if !branch_exists {
                return Err(AppError::validation("branch_id", "Branch does not exist"));
            }
        }

        let mut tx = self.db.begin().await?;

        let number = next_document_number(&mut *tx, DocumentKind::Order, Utc::now().date_naive()).await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (order_number, customer_id, branch_id, total_amount, due_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(number.to_string())
        .bind(input.customer_id)
        .bind(input.branch_id)
        .bind(total)
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for (i, (item, line)) in input.items.iter().zip(&lines).enumerate() {
            let line_total = line.total().ok_or(LineError::Overflow(i + 1))?;
            let row = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_name, description, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, order_id, product_name, description, quantity, unit_price, line_total
                "#,
            )
            .bind(order.id)
            .bind(item.product_name.trim())
            .bind(&item.description)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        tracing::info!(order_id = %order.id, order_number = %order.order_number, total = %total, "Order created");
        Ok(OrderDetail { order, items })
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<OrderDetail> {
        let order = self.find_order(id).await?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_name, description, quantity, unit_price, line_total
            FROM order_items
            WHERE order_id = $1
            ORDER BY product_name
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderDetail { order, items })
    }

    pub async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let page = shared::Pagination {
            page: filter.page.unwrap_or(1),
            per_page: filter.per_page.unwrap_or(50),
        };

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::varchar IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
              AND ($3::uuid IS NULL OR branch_id = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.customer_id)
        .bind(filter.branch_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Edit header fields of an order that has not entered production
    pub async fn update_order(&self, id: Uuid, input: UpdateOrderInput) -> AppResult<Order> {
        let order = self.find_order(id).await?;
        if order.status != OrderStatus::Pending.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Order {} is {} and can no longer be edited",
                order.order_number, order.status
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET customer_id = COALESCE($2, customer_id),
                due_date = COALESCE($3, due_date),
                notes = COALESCE($4, notes)
            WHERE id = $1 AND status = 'PENDING'
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.customer_id)
        .bind(input.due_date)
        .bind(&input.notes)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::InvalidStateTransition("Order has entered production".to_string()))?;

        Ok(order)
    }

    /// Manual status change: delivery or cancellation
    pub async fn update_status(&self, id: Uuid, to: OrderStatus) -> AppResult<Order> {
        let order = self.find_order(id).await?;
        let from = parse_status(&order.status)?;
        from.validate_manual_change(to)?;

        // Compare-and-set on the old status so a concurrent stage advance wins cleanly
        let updated = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $3 WHERE id = $1 AND status = $2 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::InvalidStateTransition("Order status changed concurrently; retry".to_string())
        })?;

        tracing::info!(order_id = %id, from = %from, to = %to, "Order status changed");
        Ok(updated)
    }

    /// Delete a pending order with no production entries
    pub async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        let order = self.find_order(id).await?;
        if order.status != OrderStatus::Pending.as_str() {
            return Err(AppError::InvalidStateTransition(format!(
                "Only pending orders can be deleted; order is {}",
                order.status
            )));
        }

        let mut tx = self.db.begin().await?;

        let has_entries = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM production_entries WHERE order_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if has_entries {
            return Err(AppError::conflict(
                "order",
                "Order has production entries and cannot be deleted",
            ));
        }

        let linked = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM invoices WHERE order_id = $1)
                OR EXISTS(SELECT 1 FROM material_usages WHERE order_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if linked {
            return Err(AppError::conflict(
                "order",
                "Order is referenced by invoices or material usage",
            ));
        }

        sqlx::query("DELETE FROM orders WHERE id = $1 AND status = 'PENDING'")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    async fn find_order(&self, id: Uuid) -> AppResult<Order> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Order"))
    }
}

pub(crate) fn parse_status(status: &str) -> AppResult<OrderStatus> {
    OrderStatus::parse(status)
        .ok_or_else(|| AppError::Internal(format!("Unknown order status {}", status)))
}
