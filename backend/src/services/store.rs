//! Retail stores, their inventory and stock transfers between them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::validate_positive_quantity;
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct StoreService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreInput {
    #[validate(length(min = 1, max = 120, message = "Store name is required"))]
    pub name: String,
    pub branch_id: Option<Uuid>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub store_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Set the stock level and price of a product in a store
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertInventoryInput {
    #[validate(length(min = 1, max = 160, message = "Product name is required"))]
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct AdjustInventoryInput {
    /// Positive receives stock, negative writes it off
    pub delta: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockTransfer {
    pub id: Uuid,
    pub from_store_id: Uuid,
    pub to_store_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub from_store_id: Uuid,
    pub to_store_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransferFilter {
    pub store_id: Option<Uuid>,
}

const STORE_COLUMNS: &str = "id, branch_id, name, location, created_at, updated_at";
const INVENTORY_COLUMNS: &str = "id, store_id, product_name, quantity, unit_price, created_at, updated_at";
const TRANSFER_COLUMNS: &str =
    "id, from_store_id, to_store_id, product_name, quantity, notes, created_by, created_at";

impl StoreService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_stores(&self, branch_id: Option<Uuid>) -> AppResult<Vec<Store>> {
        let stores = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE ($1::uuid IS NULL OR branch_id = $1) ORDER BY name"
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(stores)
    }

    pub async fn get_store(&self, id: Uuid) -> AppResult<Store> {
        sqlx::query_as::<_, Store>(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Store"))
    }

    pub async fn create_store(&self, input: StoreInput) -> AppResult<Store> {
        input.validate()?;

        let store = sqlx::query_as::<_, Store>(&format!(
            "INSERT INTO stores (branch_id, name, location) VALUES ($1, $2, $3) RETURNING {STORE_COLUMNS}"
        ))
        .bind(input.branch_id)
        .bind(input.name.trim())
        .bind(&input.location)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(store_id = %store.id, "Store created");
        Ok(store)
    }

    pub async fn update_store(&self, id: Uuid, input: StoreInput) -> AppResult<Store> {
        input.validate()?;

        sqlx::query_as::<_, Store>(&format!(
            r#"
            UPDATE stores SET branch_id = $2, name = $3, location = $4
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.branch_id)
        .bind(input.name.trim())
        .bind(&input.location)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Store"))
    }

    /// Delete a store with no sales or transfers on record
    pub async fn delete_store(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM pos_transactions WHERE store_id = $1)
                OR EXISTS(SELECT 1 FROM stock_transfers WHERE from_store_id = $1 OR to_store_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::conflict(
                "store",
                "Store has sales or transfers and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Store"));
        }
        Ok(())
    }

    // ========================================================================
    // Inventory
    // ========================================================================

    pub async fn list_inventory(&self, store_id: Uuid) -> AppResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM store_inventory WHERE store_id = $1 ORDER BY product_name"
        ))
        .bind(store_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    pub async fn upsert_inventory(
        &self,
        store_id: Uuid,
        input: UpsertInventoryInput,
    ) -> AppResult<InventoryItem> {
        input.validate()?;
        if input.quantity < Decimal::ZERO {
            return Err(AppError::validation("quantity", "Quantity cannot be negative"));
        }
        shared::validate_money(input.unit_price)
            .map_err(|msg| AppError::validation("unit_price", msg))?;
        self.get_store(store_id).await?;

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO store_inventory (store_id, product_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (store_id, product_name)
            DO UPDATE SET quantity = EXCLUDED.quantity, unit_price = EXCLUDED.unit_price
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(store_id)
        .bind(input.product_name.trim())
        .bind(input.quantity)
        .bind(input.unit_price)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(store_id = %store_id, product = %item.product_name, quantity = %item.quantity, "Store inventory set");
        Ok(item)
    }

    /// Receive or write off stock of one inventory line
    pub async fn adjust_inventory(&self, item_id: Uuid, input: AdjustInventoryInput) -> AppResult<InventoryItem> {
        if input.delta == Decimal::ZERO {
            return Err(AppError::validation("delta", "Adjustment cannot be zero"));
        }

        let mut tx = self.db.begin().await?;
        if input.delta > Decimal::ZERO {
            increment_inventory(&mut tx, item_id, input.delta).await?;
        } else {
            decrement_inventory(&mut tx, item_id, -input.delta).await?;
        }

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM store_inventory WHERE id = $1"
        ))
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(item)
    }

    pub async fn delete_inventory(&self, item_id: Uuid) -> AppResult<()> {
        let sold = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM pos_items WHERE inventory_id = $1)",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        if sold {
            return Err(AppError::conflict(
                "store_inventory",
                "Product has sales on record; set its quantity to zero instead",
            ));
        }

        let result = sqlx::query("DELETE FROM store_inventory WHERE id = $1")
            .bind(item_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Inventory item"));
        }
        Ok(())
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Move stock between two stores in one transaction
    pub async fn create_transfer(&self, user_id: Uuid, input: TransferInput) -> AppResult<StockTransfer> {
        if input.from_store_id == input.to_store_id {
            return Err(AppError::validation(
                "to_store_id",
                "Source and destination stores must differ",
            ));
        }
        validate_positive_quantity(input.quantity)?;
        let product = input.product_name.trim();

        let mut tx = self.db.begin().await?;

        let (source_id, unit_price) = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, unit_price FROM store_inventory WHERE store_id = $1 AND product_name = $2",
        )
        .bind(input.from_store_id)
        .bind(product)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::validation("product_name", "Product is not stocked at the source store"))?;

        decrement_inventory(&mut tx, source_id, input.quantity).await?;

        let destination = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stores WHERE id = $1)")
            .bind(input.to_store_id)
            .fetch_one(&mut *tx)
            .await?;
        if !destination {
            return Err(AppError::validation("to_store_id", "Destination store does not exist"));
        }

        // New lines at the destination take the source price
        sqlx::query(
            r#"
            INSERT INTO store_inventory (store_id, product_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (store_id, product_name)
            DO UPDATE SET quantity = store_inventory.quantity + EXCLUDED.quantity
            "#,
        )
        .bind(input.to_store_id)
        .bind(product)
        .bind(input.quantity)
        .bind(unit_price)
        .execute(&mut *tx)
        .await?;

        let transfer = sqlx::query_as::<_, StockTransfer>(&format!(
            r#"
            INSERT INTO stock_transfers (from_store_id, to_store_id, product_name, quantity, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TRANSFER_COLUMNS}
            "#
        ))
        .bind(input.from_store_id)
        .bind(input.to_store_id)
        .bind(product)
        .bind(input.quantity)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            transfer_id = %transfer.id,
            from = %transfer.from_store_id,
            to = %transfer.to_store_id,
            quantity = %transfer.quantity,
            "Stock transferred"
        );
        Ok(transfer)
    }

    pub async fn list_transfers(&self, filter: TransferFilter) -> AppResult<Vec<StockTransfer>> {
        let transfers = sqlx::query_as::<_, StockTransfer>(&format!(
            r#"
            SELECT {TRANSFER_COLUMNS}
            FROM stock_transfers
            WHERE ($1::uuid IS NULL OR from_store_id = $1 OR to_store_id = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.store_id)
        .fetch_all(&self.db)
        .await?;

        Ok(transfers)
    }
}

pub(crate) async fn increment_inventory(conn: &mut PgConnection, item_id: Uuid, quantity: Decimal) -> AppResult<()> {
    let result = sqlx::query("UPDATE store_inventory SET quantity = quantity + $1 WHERE id = $2")
        .bind(quantity)
        .bind(item_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Inventory item"));
    }
    Ok(())
}

/// Remove stock only if enough is on hand
pub(crate) async fn decrement_inventory(conn: &mut PgConnection, item_id: Uuid, quantity: Decimal) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE store_inventory SET quantity = quantity - $1 WHERE id = $2 AND quantity >= $1",
    )
    .bind(quantity)
    .bind(item_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let (product, available) = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT product_name, quantity FROM store_inventory WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::not_found("Inventory item"))?;

        return Err(AppError::InsufficientStock(format!(
            "{}: requested {}, available {}",
            product, quantity, available
        )));
    }
    Ok(())
}
