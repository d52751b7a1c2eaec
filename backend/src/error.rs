//! Error handling for the Fabrication ERP
//!
//! Every failure crossing a handler boundary becomes an `AppError`, which
//! renders as `{ "error": { "code", "message", "field"? } }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {message}")]
    Conflict { resource: String, message: String },

    // Business rule errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(resource.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("INVALID_CREDENTIALS", "Invalid email or password"),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone()),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action",
                ),
            ),
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new("NOT_FOUND", format!("{} not found", resource)),
            ),
            AppError::Conflict { resource, message } => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONFLICT".to_string(),
                    message: message.clone(),
                    field: Some(resource.clone()),
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INVALID_STATE_TRANSITION", msg.clone()),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new("INSUFFICIENT_STOCK", msg.clone()),
            ),
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() =>
            {
                (
                    StatusCode::CONFLICT,
                    ErrorDetail::new("DUPLICATE_ENTRY", "A record with these details already exists"),
                )
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() =>
            {
                foreign_key_error(db_err.constraint(), db_err.message())
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) =>
            {
                (
                    StatusCode::BAD_REQUEST,
                    ErrorDetail::new("VALIDATION_ERROR", "A value is outside the storable range"),
                )
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("DATABASE_ERROR", "A database error occurred"),
            ),
            AppError::Internal(_) | AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", "An internal server error occurred"),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Referencing columns, longest first so `from_store_id` wins over `store_id`
const FOREIGN_KEY_COLUMNS: &[&str] = &[
    "transaction_id",
    "from_store_id",
    "inventory_id",
    "to_store_id",
    "customer_id",
    "employee_id",
    "approved_by",
    "changed_by",
    "created_by",
    "invoice_id",
    "machine_id",
    "material_id",
    "operator_id",
    "branch_id",
    "seller_id",
    "entry_id",
    "order_id",
    "store_id",
    "user_id",
];

/// Column behind a default `<table>_<column>_fkey` constraint name
fn foreign_key_field(constraint: Option<&str>) -> Option<&'static str> {
    let name = constraint?.strip_suffix("_fkey")?;
    FOREIGN_KEY_COLUMNS
        .iter()
        .copied()
        .filter(|column| name.ends_with(&format!("_{}", column)))
        .max_by_key(|column| column.len())
}

/// A write naming a missing row is the client's mistake; a delete of a
/// row still in use is a conflict
fn foreign_key_error(constraint: Option<&str>, message: &str) -> (StatusCode, ErrorDetail) {
    let field = foreign_key_field(constraint).unwrap_or("reference");
    if message.starts_with("update or delete on table") {
        (
            StatusCode::CONFLICT,
            ErrorDetail {
                code: "CONFLICT".to_string(),
                message: "Record is still referenced by other records".to_string(),
                field: Some(field.to_string()),
            },
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            ErrorDetail {
                code: "VALIDATION_ERROR".to_string(),
                message: format!("Referenced record for {} does not exist", field),
                field: Some(field.to_string()),
            },
        )
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the first failing field, sorted for a stable response
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(*field, message)
            }
            None => AppError::validation("body", "Invalid request"),
        }
    }
}

impl From<shared::StageError> for AppError {
    fn from(err: shared::StageError) -> Self {
        match err {
            shared::StageError::Unknown(_) => AppError::validation("stage", err.to_string()),
            _ => AppError::InvalidStateTransition(err.to_string()),
        }
    }
}

impl From<shared::QuantityError> for AppError {
    fn from(err: shared::QuantityError) -> Self {
        AppError::validation(err.field(), err.to_string())
    }
}

impl From<shared::OrderStatusError> for AppError {
    fn from(err: shared::OrderStatusError) -> Self {
        AppError::InvalidStateTransition(err.to_string())
    }
}

impl From<shared::LineError> for AppError {
    fn from(err: shared::LineError) -> Self {
        AppError::validation("items", err.to_string())
    }
}

impl From<shared::BillError> for AppError {
    fn from(err: shared::BillError) -> Self {
        let field = match &err {
            shared::BillError::Line(_) => "items",
            shared::BillError::NegativeDiscount | shared::BillError::DiscountExceedsSubtotal { .. } => {
                "discount"
            }
            _ => "payments",
        };
        AppError::validation(field, err.to_string())
    }
}

impl From<shared::StockError> for AppError {
    fn from(err: shared::StockError) -> Self {
        match err {
            shared::StockError::NonPositive => AppError::validation("quantity", err.to_string()),
            shared::StockError::Insufficient { .. } => AppError::InsufficientStock(err.to_string()),
        }
    }
}

impl From<shared::InvoicePaymentError> for AppError {
    fn from(err: shared::InvoicePaymentError) -> Self {
        match err {
            shared::InvoicePaymentError::Closed(_) => AppError::InvalidStateTransition(err.to_string()),
            _ => AppError::validation("amount", err.to_string()),
        }
    }
}

impl From<shared::AttendanceError> for AppError {
    fn from(err: shared::AttendanceError) -> Self {
        match err {
            shared::AttendanceError::ShiftTooLong { .. } => AppError::validation("at", err.to_string()),
            _ => AppError::InvalidStateTransition(err.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_foreign_key_field_from_constraint() {
        assert_eq!(foreign_key_field(Some("material_usages_order_id_fkey")), Some("order_id"));
        assert_eq!(foreign_key_field(Some("purchases_seller_id_fkey")), Some("seller_id"));
        assert_eq!(foreign_key_field(Some("orders_branch_id_fkey")), Some("branch_id"));
        assert_eq!(foreign_key_field(Some("stock_transfers_from_store_id_fkey")), Some("from_store_id"));
        assert_eq!(foreign_key_field(Some("accounting_entries_created_by_fkey")), Some("created_by"));
        assert_eq!(foreign_key_field(Some("orders_pkey")), None);
        assert_eq!(foreign_key_field(None), None);
    }

    #[test]
    fn test_missing_reference_is_field_validation() {
        let (status, detail) = foreign_key_error(
            Some("material_usages_order_id_fkey"),
            "insert or update on table \"material_usages\" violates foreign key constraint \"material_usages_order_id_fkey\"",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "VALIDATION_ERROR");
        assert_eq!(detail.field.as_deref(), Some("order_id"));
    }

    #[test]
    fn test_deleting_referenced_row_conflicts() {
        let (status, detail) = foreign_key_error(
            Some("orders_customer_id_fkey"),
            "update or delete on table \"customers\" violates foreign key constraint \"orders_customer_id_fkey\" on table \"orders\"",
        );
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(detail.field.as_deref(), Some("customer_id"));
    }

    #[test]
    fn test_unknown_constraint_falls_back() {
        let (status, detail) = foreign_key_error(Some("odd_name"), "insert or update on table \"x\"");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("reference"));
    }

    #[test]
    fn test_long_shift_is_validation() {
        let err: AppError = shared::AttendanceError::ShiftTooLong { hours: 30 }.into();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "at"));
    }
}
