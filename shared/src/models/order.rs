//! Order intake models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ProductionStage;

/// Commercial status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    InProduction,
    Completed,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderStatusError {
    #[error("Order status cannot change from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },

    #[error("Status {0} is set by production progress, not manually")]
    Derived(OrderStatus),
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InProduction => "IN_PRODUCTION",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(OrderStatus::Pending),
            "IN_PRODUCTION" => Some(OrderStatus::InProduction),
            "COMPLETED" => Some(OrderStatus::Completed),
            "DELIVERED" => Some(OrderStatus::Delivered),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Status an order takes on when production reaches `stage`
    pub fn for_stage(stage: ProductionStage) -> Self {
        match stage {
            ProductionStage::Pending => OrderStatus::Pending,
            ProductionStage::Completed => OrderStatus::Completed,
            _ => OrderStatus::InProduction,
        }
    }

    /// Orders that may still move through the production pipeline
    pub fn accepts_production(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InProduction)
    }

    /// Validate a manual status change.
    ///
    /// Only delivery and cancellation are manual; the other statuses follow
    /// the production stage.
    pub fn validate_manual_change(self, to: OrderStatus) -> Result<(), OrderStatusError> {
        match (self, to) {
            (OrderStatus::Completed, OrderStatus::Delivered) => Ok(()),
            (OrderStatus::Pending | OrderStatus::InProduction, OrderStatus::Cancelled) => Ok(()),
            (_, OrderStatus::Pending | OrderStatus::InProduction | OrderStatus::Completed) => {
                Err(OrderStatusError::Derived(to))
            }
            (from, to) => Err(OrderStatusError::NotAllowed { from, to }),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quantity and price of one order or bill line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmount {
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("At least one item is required")]
    Empty,

    #[error("Item {0}: quantity must be positive")]
    NonPositiveQuantity(usize),

    #[error("Item {0}: unit price cannot be negative")]
    NegativePrice(usize),

    #[error("Item {0}: amount is too large")]
    Overflow(usize),
}

/// Largest amount a NUMERIC(14, 2) money column holds
pub fn max_money() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

impl LineAmount {
    pub fn new(quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            quantity,
            unit_price,
        }
    }

    /// Rounded line total, or `None` past the storable money range
    pub fn total(&self) -> Option<Decimal> {
        self.quantity
            .checked_mul(self.unit_price)
            .map(super::round_money)
            .filter(|total| total.abs() <= max_money())
    }
}

/// Validate line items and return their summed total
pub fn sum_lines(lines: &[LineAmount]) -> Result<Decimal, LineError> {
    if lines.is_empty() {
        return Err(LineError::Empty);
    }
    let mut total = Decimal::ZERO;
    for (i, line) in lines.iter().enumerate() {
        if line.quantity <= Decimal::ZERO {
            return Err(LineError::NonPositiveQuantity(i + 1));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(LineError::NegativePrice(i + 1));
        }
        total = line
            .total()
            .and_then(|amount| total.checked_add(amount))
            .filter(|sum| *sum <= max_money())
            .ok_or(LineError::Overflow(i + 1))?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn huge() -> Decimal {
        Decimal::from_str("100000000000000000000").unwrap()
    }

    #[test]
    fn line_amount_reads_string_decimals() {
        let line: LineAmount =
            serde_json::from_str(r#"{"quantity":"2.5","unit_price":"10.10"}"#).unwrap();
        assert_eq!(line.total(), Some(Decimal::new(2525, 2)));
        assert_eq!(
            serde_json::to_string(&line).unwrap(),
            r#"{"quantity":"2.5","unit_price":"10.10"}"#
        );
    }

    #[test]
    fn oversized_line_is_reported() {
        assert_eq!(LineAmount::new(huge(), huge()).total(), None);
        assert_eq!(LineAmount::new(Decimal::MAX, Decimal::from(2)).total(), None);
        assert_eq!(
            sum_lines(&[LineAmount::new(huge(), huge())]),
            Err(LineError::Overflow(1))
        );
    }

    #[test]
    fn sum_stops_at_money_column_limit() {
        let full = LineAmount::new(Decimal::ONE, max_money());
        assert_eq!(sum_lines(&[full]), Ok(max_money()));
        assert_eq!(
            sum_lines(&[full, LineAmount::new(Decimal::ONE, Decimal::new(1, 2))]),
            Err(LineError::Overflow(2))
        );
    }

    /// Any value a 96-bit decimal can hold
    fn decimal_strategy() -> impl Strategy<Value = Decimal> {
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
            .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_line_total_never_panics(
            quantity in decimal_strategy(),
            unit_price in decimal_strategy()
        ) {
            if let Some(total) = LineAmount::new(quantity, unit_price).total() {
                prop_assert!(total.abs() <= max_money());
            }
        }

        #[test]
        fn prop_accepted_sums_fit_money_column(
            lines in prop::collection::vec((decimal_strategy(), decimal_strategy()), 1..6)
        ) {
            let lines: Vec<LineAmount> = lines
                .into_iter()
                .map(|(quantity, unit_price)| LineAmount::new(quantity, unit_price))
                .collect();
            if let Ok(total) = sum_lines(&lines) {
                prop_assert!(total >= Decimal::ZERO);
                prop_assert!(total <= max_money());
            }
        }
    }
}
