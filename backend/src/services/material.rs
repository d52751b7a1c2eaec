//! Raw material stock, sellers, purchases and usage
//!
//! Stock moves only through single-statement guarded updates; a decrement
//! that would take a material below zero affects no row and is reported
//! as insufficient stock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    needs_reorder, stock_delta, validate_positive_quantity, LineAmount, ReferenceType, StockUnit,
};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::accounting::{post_reference_entry, remove_reference_entries, restate_reference_entry};
use super::indian_phone;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RawMaterial {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub reorder_level: Decimal,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RawMaterialInput {
    #[validate(length(min = 1, max = 120, message = "Material name is required"))]
    pub name: String,
    pub unit: StockUnit,
    #[serde(default)]
    pub reorder_level: Decimal,
    #[serde(default)]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Seller {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gstin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SellerInput {
    #[validate(length(min = 1, max = 120, message = "Seller name is required"))]
    pub name: String,
    pub contact_person: Option<String>,
    #[validate(custom = "indian_phone")]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub address: Option<String>,
    #[validate(custom = "crate::services::gstin")]
    pub gstin: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub material_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub purchase_date: NaiveDate,
    pub invoice_reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseInput {
    pub material_id: Uuid,
    pub seller_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub purchase_date: Option<NaiveDate>,
    pub invoice_reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MaterialUsage {
    pub id: Uuid,
    pub material_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: Decimal,
    pub purpose: Option<String>,
    pub usage_date: NaiveDate,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UsageInput {
    pub material_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: Decimal,
    pub purpose: Option<String>,
    pub usage_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    pub material_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

const MATERIAL_COLUMNS: &str =
    "id, name, unit, quantity, reorder_level, unit_cost, created_at, updated_at";
const SELLER_COLUMNS: &str =
    "id, name, contact_person, phone, email, address, gstin, created_at, updated_at";
const PURCHASE_COLUMNS: &str = "id, material_id, seller_id, quantity, unit_price, total_amount, \
     purchase_date, invoice_reference, notes, created_by, created_at, updated_at";
const USAGE_COLUMNS: &str =
    "id, material_id, order_id, quantity, purpose, usage_date, created_by, created_at, updated_at";

impl MaterialService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Raw materials
    // ========================================================================

    pub async fn list_materials(&self) -> AppResult<Vec<RawMaterial>> {
        let materials = sqlx::query_as::<_, RawMaterial>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM raw_materials ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    pub async fn get_material(&self, id: Uuid) -> AppResult<RawMaterial> {
        sqlx::query_as::<_, RawMaterial>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM raw_materials WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Raw material"))
    }

    /// Register a material. Stock starts at zero and only moves through purchases and usage.
    pub async fn create_material(&self, input: RawMaterialInput) -> AppResult<RawMaterial> {
        input.validate()?;
        check_levels(&input)?;

        let material = sqlx::query_as::<_, RawMaterial>(&format!(
            r#"
            INSERT INTO raw_materials (name, unit, reorder_level, unit_cost)
            VALUES ($1, $2, $3, $4)
            RETURNING {MATERIAL_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(input.unit.as_str())
        .bind(input.reorder_level)
        .bind(input.unit_cost)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(material_id = %material.id, name = %material.name, "Raw material created");
        Ok(material)
    }

    pub async fn update_material(&self, id: Uuid, input: RawMaterialInput) -> AppResult<RawMaterial> {
        input.validate()?;
        check_levels(&input)?;

        sqlx::query_as::<_, RawMaterial>(&format!(
            r#"
            UPDATE raw_materials
            SET name = $2, unit = $3, reorder_level = $4, unit_cost = $5
            WHERE id = $1
            RETURNING {MATERIAL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.unit.as_str())
        .bind(input.reorder_level)
        .bind(input.unit_cost)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Raw material"))
    }

    pub async fn delete_material(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM purchases WHERE material_id = $1)
                OR EXISTS(SELECT 1 FROM material_usages WHERE material_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::conflict(
                "raw_material",
                "Material has purchases or usage recorded and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM raw_materials WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Raw material"));
        }
        Ok(())
    }

    /// Materials at or below their reorder level
    pub async fn low_stock_materials(&self) -> AppResult<Vec<RawMaterial>> {
        let materials = sqlx::query_as::<_, RawMaterial>(&format!(
            r#"
            SELECT {MATERIAL_COLUMNS}
            FROM raw_materials
            WHERE quantity <= reorder_level
            ORDER BY (quantity - reorder_level), name
            "#
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    // ========================================================================
    // Sellers
    // ========================================================================

    pub async fn list_sellers(&self) -> AppResult<Vec<Seller>> {
        let sellers = sqlx::query_as::<_, Seller>(&format!(
            "SELECT {SELLER_COLUMNS} FROM sellers ORDER BY name"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(sellers)
    }

    pub async fn get_seller(&self, id: Uuid) -> AppResult<Seller> {
        sqlx::query_as::<_, Seller>(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Seller"))
    }

    pub async fn create_seller(&self, input: SellerInput) -> AppResult<Seller> {
        input.validate()?;

        let seller = sqlx::query_as::<_, Seller>(&format!(
            r#"
            INSERT INTO sellers (name, contact_person, phone, email, address, gstin)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SELLER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_one(&self.db)
        .await?;

        Ok(seller)
    }

    pub async fn update_seller(&self, id: Uuid, input: SellerInput) -> AppResult<Seller> {
        input.validate()?;

        sqlx::query_as::<_, Seller>(&format!(
            r#"
            UPDATE sellers
            SET name = $2, contact_person = $3, phone = $4, email = $5, address = $6, gstin = $7
            WHERE id = $1
            RETURNING {SELLER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.gstin)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Seller"))
    }

    pub async fn delete_seller(&self, id: Uuid) -> AppResult<()> {
        let referenced =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM purchases WHERE seller_id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await?;

        if referenced {
            return Err(AppError::conflict("seller", "Seller has purchases and cannot be deleted"));
        }

        let result = sqlx::query("DELETE FROM sellers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Seller"));
        }
        Ok(())
    }

    // ========================================================================
    // Purchases
    // ========================================================================

    pub async fn list_purchases(&self, filter: MovementFilter) -> AppResult<Vec<Purchase>> {
        super::accounting::check_range(filter.start_date, filter.end_date)?;

        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM purchases
            WHERE ($1::uuid IS NULL OR material_id = $1)
              AND ($2::date IS NULL OR purchase_date >= $2)
              AND ($3::date IS NULL OR purchase_date <= $3)
            ORDER BY purchase_date DESC, created_at DESC
            "#
        ))
        .bind(filter.material_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(purchases)
    }

    pub async fn get_purchase(&self, id: Uuid) -> AppResult<Purchase> {
        sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase"))
    }

    /// Record a purchase: stock goes up and an expense is booked
    pub async fn create_purchase(&self, user_id: Uuid, input: PurchaseInput) -> AppResult<Purchase> {
        validate_positive_quantity(input.quantity)?;
        let total = purchase_total(&input)?;
        let date = input.purchase_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        ensure_seller(&mut tx, input.seller_id).await?;

        let name = increment_material(&mut tx, input.material_id, input.quantity).await?;

        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            INSERT INTO purchases
                (material_id, seller_id, quantity, unit_price, total_amount, purchase_date,
                 invoice_reference, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(input.material_id)
        .bind(input.seller_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total)
        .bind(date)
        .bind(&input.invoice_reference)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        post_reference_entry(
            &mut tx,
            ReferenceType::Purchase,
            purchase.id,
            total,
            date,
            format!("Purchase of {} {}", input.quantity, name),
            user_id,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(purchase_id = %purchase.id, material_id = %purchase.material_id, quantity = %purchase.quantity, "Purchase recorded");
        Ok(purchase)
    }

    /// Edit a purchase; stock moves by the quantity difference
    pub async fn update_purchase(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: PurchaseInput,
    ) -> AppResult<Purchase> {
        validate_positive_quantity(input.quantity)?;
        let total = purchase_total(&input)?;

        let mut tx = self.db.begin().await?;

        ensure_seller(&mut tx, input.seller_id).await?;

        let old = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase"))?;

        let name = if old.material_id != input.material_id {
            // Moving a purchase between materials: take it all back, then re-add
            decrement_material(&mut tx, old.material_id, old.quantity).await?;
            increment_material(&mut tx, input.material_id, input.quantity).await?
        } else {
            apply_material_delta(&mut tx, old.material_id, stock_delta(old.quantity, input.quantity)).await?;
            sqlx::query_scalar::<_, String>("SELECT name FROM raw_materials WHERE id = $1")
                .bind(old.material_id)
                .fetch_one(&mut *tx)
                .await?
        };

        let date = input.purchase_date.unwrap_or(old.purchase_date);

        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            r#"
            UPDATE purchases
            SET material_id = $2, seller_id = $3, quantity = $4, unit_price = $5,
                total_amount = $6, purchase_date = $7, invoice_reference = $8, notes = $9
            WHERE id = $1
            RETURNING {PURCHASE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.material_id)
        .bind(input.seller_id)
        .bind(input.quantity)
        .bind(input.unit_price)
        .bind(total)
        .bind(date)
        .bind(&input.invoice_reference)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        restate_reference_entry(
            &mut tx,
            ReferenceType::Purchase,
            id,
            total,
            date,
            format!("Purchase of {} {}", input.quantity, name),
            user_id,
        )
        .await?;

        tx.commit().await?;
        Ok(purchase)
    }

    /// Delete a purchase, taking its quantity back out of stock
    pub async fn delete_purchase(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let purchase = sqlx::query_as::<_, (Uuid, Decimal)>(
            "DELETE FROM purchases WHERE id = $1 RETURNING material_id, quantity",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Purchase"))?;

        decrement_material(&mut tx, purchase.0, purchase.1).await?;
        remove_reference_entries(&mut tx, ReferenceType::Purchase, id).await?;

        tx.commit().await?;

        tracing::info!(purchase_id = %id, "Purchase deleted and stock reversed");
        Ok(())
    }

    // ========================================================================
    // Usage
    // ========================================================================

    pub async fn list_usages(&self, filter: MovementFilter) -> AppResult<Vec<MaterialUsage>> {
        super::accounting::check_range(filter.start_date, filter.end_date)?;

        let usages = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            SELECT {USAGE_COLUMNS}
            FROM material_usages
            WHERE ($1::uuid IS NULL OR material_id = $1)
              AND ($2::date IS NULL OR usage_date >= $2)
              AND ($3::date IS NULL OR usage_date <= $3)
            ORDER BY usage_date DESC, created_at DESC
            "#
        ))
        .bind(filter.material_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(usages)
    }

    /// Issue material to the shop floor
    pub async fn create_usage(&self, user_id: Uuid, input: UsageInput) -> AppResult<MaterialUsage> {
        validate_positive_quantity(input.quantity)?;

        let mut tx = self.db.begin().await?;

        if let Some(order_id) = input.order_id {
            ensure_order(&mut tx, order_id).await?;
        }

        decrement_material(&mut tx, input.material_id, input.quantity).await?;

        let usage = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            INSERT INTO material_usages (material_id, order_id, quantity, purpose, usage_date, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USAGE_COLUMNS}
            "#
        ))
        .bind(input.material_id)
        .bind(input.order_id)
        .bind(input.quantity)
        .bind(&input.purpose)
        .bind(input.usage_date.unwrap_or_else(|| Utc::now().date_naive()))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(usage_id = %usage.id, material_id = %usage.material_id, quantity = %usage.quantity, "Material issued");
        Ok(usage)
    }

    pub async fn update_usage(&self, id: Uuid, input: UsageInput) -> AppResult<MaterialUsage> {
        validate_positive_quantity(input.quantity)?;

        let mut tx = self.db.begin().await?;

        let old = sqlx::query_as::<_, MaterialUsage>(&format!(
            "SELECT {USAGE_COLUMNS} FROM material_usages WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Material usage"))?;

        if let Some(order_id) = input.order_id {
            ensure_order(&mut tx, order_id).await?;
        }

        if old.material_id != input.material_id {
            increment_material(&mut tx, old.material_id, old.quantity).await?;
            decrement_material(&mut tx, input.material_id, input.quantity).await?;
        } else {
            // More usage means less stock
            apply_material_delta(&mut tx, old.material_id, stock_delta(input.quantity, old.quantity)).await?;
        }

        let usage = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            UPDATE material_usages
            SET material_id = $2, order_id = $3, quantity = $4, purpose = $5,
                usage_date = COALESCE($6, usage_date)
            WHERE id = $1
            RETURNING {USAGE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.material_id)
        .bind(input.order_id)
        .bind(input.quantity)
        .bind(&input.purpose)
        .bind(input.usage_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(usage)
    }

    /// Delete a usage record, returning its quantity to stock
    pub async fn delete_usage(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let (material_id, quantity) = sqlx::query_as::<_, (Uuid, Decimal)>(
            "DELETE FROM material_usages WHERE id = $1 RETURNING material_id, quantity",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("Material usage"))?;

        increment_material(&mut tx, material_id, quantity).await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Add stock; returns the material name for descriptions
async fn increment_material(conn: &mut PgConnection, id: Uuid, quantity: Decimal) -> AppResult<String> {
    sqlx::query_scalar::<_, String>(
        "UPDATE raw_materials SET quantity = quantity + $1 WHERE id = $2 RETURNING name",
    )
    .bind(quantity)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::validation("material_id", "Raw material does not exist"))
}

/// Remove stock only if enough is on hand
async fn decrement_material(conn: &mut PgConnection, id: Uuid, quantity: Decimal) -> AppResult<()> {
    let levels = sqlx::query_as::<_, (String, Decimal, Decimal)>(
        r#"
        UPDATE raw_materials SET quantity = quantity - $1, updated_at = NOW()
        WHERE id = $2 AND quantity >= $1
        RETURNING name, quantity, reorder_level
        "#,
    )
    .bind(quantity)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some((name, remaining, reorder_level)) = levels {
        if needs_reorder(remaining, reorder_level) {
            tracing::warn!(material = %name, %remaining, %reorder_level, "Raw material at reorder level");
        }
    } else {
        let available = sqlx::query_scalar::<_, Decimal>("SELECT quantity FROM raw_materials WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::validation("material_id", "Raw material does not exist"))?;
        return Err(shared::StockError::Insufficient {
            requested: quantity,
            available,
        }
        .into());
    }
    Ok(())
}

async fn apply_material_delta(conn: &mut PgConnection, id: Uuid, delta: Decimal) -> AppResult<()> {
    if delta > Decimal::ZERO {
        increment_material(conn, id, delta).await?;
    } else if delta < Decimal::ZERO {
        decrement_material(conn, id, -delta).await?;
    }
    Ok(())
}

fn check_levels(input: &RawMaterialInput) -> AppResult<()> {
    if input.reorder_level < Decimal::ZERO {
        return Err(AppError::validation("reorder_level", "Reorder level cannot be negative"));
    }
    shared::validate_money(input.unit_cost).map_err(|msg| AppError::validation("unit_cost", msg))
}

fn check_price(unit_price: Decimal) -> AppResult<()> {
    shared::validate_money(unit_price).map_err(|msg| AppError::validation("unit_price", msg))
}

fn purchase_total(input: &PurchaseInput) -> AppResult<Decimal> {
    check_price(input.unit_price)?;
    LineAmount::new(input.quantity, input.unit_price)
        .total()
        .ok_or_else(|| AppError::validation("unit_price", "Purchase amount is too large"))
}

async fn ensure_seller(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM sellers WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(AppError::validation("seller_id", "Seller does not exist"));
    }
    Ok(())
}

async fn ensure_order(conn: &mut PgConnection, id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if !exists {
        return Err(AppError::validation("order_id", "Order does not exist"));
    }
    Ok(())
}
