//! Production stage pipeline and production entry rules

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A step in the fixed production pipeline of an order.
///
/// Variants are declared in pipeline order; the discriminant is the stage
/// index used by the transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionStage {
    Pending,
    Cutting,
    Shaping,
    Bending,
    WeldingInner,
    WeldingOuter,
    Grinding,
    Finishing,
    Painting,
    Completed,
}

/// Errors raised by stage parsing and transitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("Unknown production stage: {0}")]
    Unknown(String),

    #[error("Order has already completed production")]
    AlreadyCompleted,

    #[error("Order is already at stage {0}")]
    SameStage(ProductionStage),

    #[error("Cannot move back from {from} to {to}")]
    Regression {
        from: ProductionStage,
        to: ProductionStage,
    },

    #[error("Cannot skip from {from} to {to}; next stage is {expected}")]
    Skip {
        from: ProductionStage,
        to: ProductionStage,
        expected: ProductionStage,
    },
}

impl ProductionStage {
    pub const ALL: [ProductionStage; 10] = [
        ProductionStage::Pending,
        ProductionStage::Cutting,
        ProductionStage::Shaping,
        ProductionStage::Bending,
        ProductionStage::WeldingInner,
        ProductionStage::WeldingOuter,
        ProductionStage::Grinding,
        ProductionStage::Finishing,
        ProductionStage::Painting,
        ProductionStage::Completed,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The stage that directly follows this one, if any
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn is_completed(self) -> bool {
        self == ProductionStage::Completed
    }

    /// Stages on which operators log work sessions
    pub fn is_work_stage(self) -> bool {
        !matches!(self, ProductionStage::Pending | ProductionStage::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionStage::Pending => "PENDING",
            ProductionStage::Cutting => "CUTTING",
            ProductionStage::Shaping => "SHAPING",
            ProductionStage::Bending => "BENDING",
            ProductionStage::WeldingInner => "WELDING_INNER",
            ProductionStage::WeldingOuter => "WELDING_OUTER",
            ProductionStage::Grinding => "GRINDING",
            ProductionStage::Finishing => "FINISHING",
            ProductionStage::Painting => "PAINTING",
            ProductionStage::Completed => "COMPLETED",
        }
    }

    /// Check that moving from `self` to `to` is exactly one step forward
    pub fn validate_transition(self, to: ProductionStage) -> Result<(), StageError> {
        if self.is_completed() {
            return Err(StageError::AlreadyCompleted);
        }
        if to == self {
            return Err(StageError::SameStage(self));
        }
        if to < self {
            return Err(StageError::Regression { from: self, to });
        }
        match self.next() {
            Some(expected) if expected == to => Ok(()),
            Some(expected) => Err(StageError::Skip {
                from: self,
                to,
                expected,
            }),
            None => Err(StageError::AlreadyCompleted),
        }
    }
}

impl fmt::Display for ProductionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionStage {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| StageError::Unknown(s.to_string()))
    }
}

/// Lifecycle of a production entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryStatus {
    InProgress,
    Completed,
    Approved,
    Rejected,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::InProgress => "IN_PROGRESS",
            EntryStatus::Completed => "COMPLETED",
            EntryStatus::Approved => "APPROVED",
            EntryStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN_PROGRESS" => Some(EntryStatus::InProgress),
            "COMPLETED" => Some(EntryStatus::Completed),
            "APPROVED" => Some(EntryStatus::Approved),
            "REJECTED" => Some(EntryStatus::Rejected),
            _ => None,
        }
    }

    /// Quantities may be edited until a supervisor has signed off
    pub fn is_editable(&self) -> bool {
        matches!(self, EntryStatus::InProgress | EntryStatus::Completed)
    }
}

/// Errors for production entry quantities
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Input quantity must be positive")]
    NonPositiveInput,

    #[error("{0} quantity cannot be negative")]
    Negative(&'static str),

    #[error("Output ({output}) plus rejected ({rejected}) exceeds input ({input})")]
    ExceedsInput { input: i32, output: i32, rejected: i32 },
}

impl QuantityError {
    /// Form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            QuantityError::NonPositiveInput => "input_quantity",
            QuantityError::Negative("Output") => "output_quantity",
            QuantityError::Negative(_) => "rejected_quantity",
            QuantityError::ExceedsInput { .. } => "output_quantity",
        }
    }
}

/// Piece counts recorded for one production entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuantities {
    pub input: i32,
    pub output: i32,
    pub rejected: i32,
}

impl EntryQuantities {
    pub fn new(input: i32, output: i32, rejected: i32) -> Self {
        Self {
            input,
            output,
            rejected,
        }
    }

    /// Enforce `output + rejected <= input` with non-negative counts
    pub fn validate(&self) -> Result<(), QuantityError> {
        if self.input <= 0 {
            return Err(QuantityError::NonPositiveInput);
        }
        if self.output < 0 {
            return Err(QuantityError::Negative("Output"));
        }
        if self.rejected < 0 {
            return Err(QuantityError::Negative("Rejected"));
        }
        if i64::from(self.output) + i64::from(self.rejected) > i64::from(self.input) {
            return Err(QuantityError::ExceedsInput {
                input: self.input,
                output: self.output,
                rejected: self.rejected,
            });
        }
        Ok(())
    }

    /// Pieces neither delivered nor explicitly rejected
    pub fn wastage(&self) -> i32 {
        self.input - self.output - self.rejected
    }

    /// Share of input that did not become output, in percent (2 dp)
    pub fn wastage_percent(&self) -> Decimal {
        calculate_wastage_percent(self.input, self.output)
    }
}

/// Wastage percentage: `(input - output) / input × 100`, rounded to 2 dp
pub fn calculate_wastage_percent(input: i32, output: i32) -> Decimal {
    if input <= 0 {
        return Decimal::ZERO;
    }
    let lost = Decimal::from(input - output);
    (lost / Decimal::from(input) * Decimal::from(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Operational state of a machine on the shop floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MachineStatus {
    Active,
    InUse,
    Maintenance,
    Inactive,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Active => "ACTIVE",
            MachineStatus::InUse => "IN_USE",
            MachineStatus::Maintenance => "MAINTENANCE",
            MachineStatus::Inactive => "INACTIVE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(MachineStatus::Active),
            "IN_USE" => Some(MachineStatus::InUse),
            "MAINTENANCE" => Some(MachineStatus::Maintenance),
            "INACTIVE" => Some(MachineStatus::Inactive),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_matches_pipeline() {
        for (i, stage) in ProductionStage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert_eq!(ProductionStage::from_index(i), Some(*stage));
        }
        assert_eq!(ProductionStage::Completed.next(), None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "welding_inner".parse::<ProductionStage>(),
            Ok(ProductionStage::WeldingInner)
        );
        assert!("POLISHING".parse::<ProductionStage>().is_err());
    }

    #[test]
    fn stored_statuses_parse_back() {
        for status in [
            EntryStatus::InProgress,
            EntryStatus::Completed,
            EntryStatus::Approved,
            EntryStatus::Rejected,
        ] {
            assert_eq!(EntryStatus::parse(status.as_str()), Some(status));
        }
        for status in [
            MachineStatus::Active,
            MachineStatus::InUse,
            MachineStatus::Maintenance,
            MachineStatus::Inactive,
        ] {
            assert_eq!(MachineStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MachineStatus::parse("in_use"), None);
    }

    #[test]
    fn exceeds_input_reports_output_field() {
        let err = EntryQuantities::new(10, 8, 3).validate().unwrap_err();
        assert_eq!(err.field(), "output_quantity");
        assert_eq!(
            EntryQuantities::new(10, 0, -1).validate().unwrap_err().field(),
            "rejected_quantity"
        );
    }
}
