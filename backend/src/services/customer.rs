//! Customer management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::indian_phone;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 120, message = "Customer name is required"))]
    pub name: String,
    #[validate(custom = "indian_phone")]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(custom = "crate::services::gstin")]
    pub gstin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerFilter {
    /// Case-insensitive match on name or phone
    pub search: Option<String>,
}

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, gstin, created_at, updated_at";

impl CustomerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_customers(&self, filter: CustomerFilter) -> AppResult<Vec<Customer>> {
        let pattern = filter.search.map(|s| format!("%{}%", s.trim()));

        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE ($1::varchar IS NULL OR name ILIKE $1 OR phone ILIKE $1)
            ORDER BY name
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))
    }

    pub async fn create_customer(&self, input: CustomerInput) -> AppResult<Customer> {
        input.validate()?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (name, phone, email, address, gstin)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn update_customer(&self, id: Uuid, input: CustomerInput) -> AppResult<Customer> {
        input.validate()?;

        sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET name = $2, phone = $3, email = $4, address = $5, gstin = $6
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Customer"))
    }

    /// Delete a customer that has no orders, bills or invoices
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM orders WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM invoices WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM pos_transactions WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM final_product_sales WHERE customer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::conflict(
                "customer",
                "Customer has orders or sales and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Customer"));
        }

        Ok(())
    }

    /// GSTIN registered for a customer, if any
    pub async fn customer_gstin(&self, id: Uuid) -> AppResult<Option<String>> {
        sqlx::query_scalar::<_, Option<String>>("SELECT gstin FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))
    }
}
