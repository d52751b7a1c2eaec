//! Branch management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{field_error, indian_phone};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BranchService {
    db: PgPool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BranchInput {
    #[validate(length(min = 1, max = 120, message = "Branch name is required"))]
    pub name: String,
    #[validate(custom = "branch_code")]
    pub code: String,
    pub address: Option<String>,
    #[validate(custom = "indian_phone")]
    pub phone: Option<String>,
}

fn branch_code(code: &str) -> Result<(), ValidationError> {
    shared::validate_branch_code(code).map_err(|msg| field_error("code", msg))
}

impl BranchService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT id, name, code, address, phone, created_at, updated_at FROM branches ORDER BY code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(branches)
    }

    pub async fn get_branch(&self, id: Uuid) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            "SELECT id, name, code, address, phone, created_at, updated_at FROM branches WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Branch"))
    }

    pub async fn create_branch(&self, input: BranchInput) -> AppResult<Branch> {
        input.validate()?;

        let branch = sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (name, code, address, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, code, address, phone, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(branch_id = %branch.id, code = %branch.code, "Branch created");
        Ok(branch)
    }

    pub async fn update_branch(&self, id: Uuid, input: BranchInput) -> AppResult<Branch> {
        input.validate()?;

        sqlx::query_as::<_, Branch>(
            r#"
            UPDATE branches
            SET name = $2, code = $3, address = $4, phone = $5
            WHERE id = $1
            RETURNING id, name, code, address, phone, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.code)
        .bind(&input.address)
        .bind(&input.phone)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("Branch"))
    }

    /// Delete a branch that no user is assigned to
    pub async fn delete_branch(&self, id: Uuid) -> AppResult<()> {
        let users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE branch_id = $1")
            .bind(id)
            .fetch_one(&self.db)
            .await?;

        if users > 0 {
            return Err(AppError::conflict(
                "branch",
                format!("Branch still has {} user(s) assigned", users),
            ));
        }

        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Branch"));
        }

        tracing::info!(branch_id = %id, "Branch deleted");
        Ok(())
    }
}
