//! Point-of-sale models and bill arithmetic

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{compute_gst, max_money, round_money, sum_lines, LineAmount, LineError};

/// Payment instrument for a POS payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::BankTransfer => "BANK_TRANSFER",
        }
    }
}

/// POS transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PosStatus {
    Completed,
    Refunded,
}

impl PosStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosStatus::Completed => "COMPLETED",
            PosStatus::Refunded => "REFUNDED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillError {
    #[error(transparent)]
    Line(#[from] LineError),

    #[error("Discount cannot be negative")]
    NegativeDiscount,

    #[error("Discount ({discount}) exceeds subtotal ({subtotal})")]
    DiscountExceedsSubtotal { discount: Decimal, subtotal: Decimal },

    #[error("At least one payment is required")]
    NoPayments,

    #[error("Payment amount is too large")]
    PaymentTooLarge,

    #[error("Payment amounts must be positive")]
    NonPositivePayment,

    #[error("Paid {paid} is less than bill total {total}")]
    Underpaid { paid: Decimal, total: Decimal },

    #[error("Change of {change} exceeds the cash tendered")]
    ChangeWithoutCash { change: Decimal },
}

/// Computed totals of a bill before payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Compute subtotal, discount, flat-rate GST and total for a bill
pub fn compute_bill(
    lines: &[LineAmount],
    discount: Decimal,
    gst_rate_percent: Decimal,
) -> Result<BillTotals, BillError> {
    let subtotal = sum_lines(lines)?;
    if discount < Decimal::ZERO {
        return Err(BillError::NegativeDiscount);
    }
    let discount = round_money(discount);
    if discount > subtotal {
        return Err(BillError::DiscountExceedsSubtotal { discount, subtotal });
    }

    let gst = compute_gst(subtotal - discount, gst_rate_percent, false);
    Ok(BillTotals {
        subtotal,
        discount,
        taxable_amount: gst.taxable_amount,
        tax_amount: gst.total_tax,
        total: gst.grand_total,
    })
}

/// Outcome of tendering payments against a bill total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub amount_paid: Decimal,
    pub change_given: Decimal,
}

/// Validate tendered payments. Change can only be returned out of cash.
pub fn settle_payments(
    total: Decimal,
    payments: &[(PaymentMethod, Decimal)],
) -> Result<Settlement, BillError> {
    if payments.is_empty() {
        return Err(BillError::NoPayments);
    }
    if payments.iter().any(|(_, amount)| *amount <= Decimal::ZERO) {
        return Err(BillError::NonPositivePayment);
    }
    if payments.iter().any(|(_, amount)| *amount > max_money()) {
        return Err(BillError::PaymentTooLarge);
    }

    let paid: Decimal = payments.iter().map(|(_, amount)| *amount).sum();
    if paid < total {
        return Err(BillError::Underpaid { paid, total });
    }

    let change = paid - total;
    let cash: Decimal = payments
        .iter()
        .filter(|(method, _)| *method == PaymentMethod::Cash)
        .map(|(_, amount)| *amount)
        .sum();
    if change > cash {
        return Err(BillError::ChangeWithoutCash { change });
    }

    Ok(Settlement {
        amount_paid: paid,
        change_given: change,
    })
}
