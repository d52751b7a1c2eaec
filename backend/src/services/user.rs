//! User account administration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::UserRole;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{field_error, AuthService};
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

/// User account as returned by the API (never includes the password hash)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub branch_id: Option<Uuid>,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(custom = "password_strength")]
    pub password: String,
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    pub role: UserRole,
    pub branch_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserInput {
    #[validate(length(min = 1, max = 120, message = "Name is required"))]
    pub name: String,
    pub role: UserRole,
    pub branch_id: Option<Uuid>,
    #[validate(custom = "password_strength")]
    pub password: Option<String>,
}

fn password_strength(password: &str) -> Result<(), ValidationError> {
    shared::validate_password(password).map_err(|msg| field_error("password", msg))
}

const USER_COLUMNS: &str =
    "id, branch_id, email, name, role, is_active, last_login_at, created_at, updated_at";

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_users(&self, branch_id: Option<Uuid>) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE ($1::uuid IS NULL OR branch_id = $1) ORDER BY name"
        ))
        .bind(branch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    pub async fn get_user(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        input.validate()?;
        let email = input.email.trim().to_lowercase();

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = $1)",
        )
        .bind(&email)
        .fetch_one(&self.db)
        .await?;

        if taken {
            return Err(AppError::conflict("email", "Email is already registered"));
        }

        let password_hash = AuthService::hash_password(&input.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (branch_id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(input.branch_id)
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(input.role.as_str())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn update_user(&self, id: Uuid, input: UpdateUserInput) -> AppResult<User> {
        input.validate()?;

        let password_hash = input
            .password
            .as_deref()
            .map(AuthService::hash_password)
            .transpose()?;

        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, role = $3, branch_id = $4,
                password_hash = COALESCE($5, password_hash)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(input.role.as_str())
        .bind(input.branch_id)
        .bind(password_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
    }

    /// Disable an account and revoke its refresh tokens
    pub async fn deactivate_user(&self, actor_id: Uuid, id: Uuid) -> AppResult<User> {
        if actor_id == id {
            return Err(AppError::validation("id", "You cannot deactivate your own account"));
        }

        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = false WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %id, "User deactivated");
        Ok(user)
    }

    pub async fn activate_user(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = true WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
    }
}
