//! Stock ledger rules shared by raw materials, store inventory and transfers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unit a raw material is stocked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockUnit {
    Kg,
    Piece,
    Meter,
    Sheet,
    Litre,
}

impl StockUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockUnit::Kg => "KG",
            StockUnit::Piece => "PIECE",
            StockUnit::Meter => "METER",
            StockUnit::Sheet => "SHEET",
            StockUnit::Litre => "LITRE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be positive")]
    NonPositive,

    #[error("Insufficient stock: requested {requested}, available {available}")]
    Insufficient { requested: Decimal, available: Decimal },
}

/// Remaining stock after taking `quantity` out of `available`
pub fn checked_decrement(available: Decimal, quantity: Decimal) -> Result<Decimal, StockError> {
    if quantity <= Decimal::ZERO {
        return Err(StockError::NonPositive);
    }
    if quantity > available {
        return Err(StockError::Insufficient {
            requested: quantity,
            available,
        });
    }
    Ok(available - quantity)
}

/// How a record edit moves stock: positive adds, negative removes
pub fn stock_delta(old_quantity: Decimal, new_quantity: Decimal) -> Decimal {
    new_quantity - old_quantity
}

/// Whether a stock level has fallen to its reorder point
pub fn needs_reorder(quantity: Decimal, reorder_level: Decimal) -> bool {
    quantity <= reorder_level
}

/// Positive quantity check used by every stock-moving form
pub fn validate_positive_quantity(quantity: Decimal) -> Result<(), StockError> {
    if quantity <= Decimal::ZERO {
        Err(StockError::NonPositive)
    } else {
        Ok(())
    }
}
