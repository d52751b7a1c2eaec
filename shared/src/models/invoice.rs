//! Invoice models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoicePaymentError {
    #[error("Payment amount must be positive")]
    NonPositive,

    #[error("Invoice is {0} and cannot take payments")]
    Closed(InvoiceStatus),

    #[error("Payment of {amount} exceeds outstanding balance {outstanding}")]
    Overpayment { amount: Decimal, outstanding: Decimal },
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "UNPAID",
            InvoiceStatus::PartiallyPaid => "PARTIALLY_PAID",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "UNPAID" => Some(InvoiceStatus::Unpaid),
            "PARTIALLY_PAID" => Some(InvoiceStatus::PartiallyPaid),
            "PAID" => Some(InvoiceStatus::Paid),
            "CANCELLED" => Some(InvoiceStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a payment to an invoice, returning the new paid amount and status
pub fn apply_invoice_payment(
    status: InvoiceStatus,
    total: Decimal,
    already_paid: Decimal,
    amount: Decimal,
) -> Result<(Decimal, InvoiceStatus), InvoicePaymentError> {
    if matches!(status, InvoiceStatus::Paid | InvoiceStatus::Cancelled) {
        return Err(InvoicePaymentError::Closed(status));
    }
    if amount <= Decimal::ZERO {
        return Err(InvoicePaymentError::NonPositive);
    }

    let outstanding = total - already_paid;
    if amount > outstanding {
        return Err(InvoicePaymentError::Overpayment {
            amount,
            outstanding,
        });
    }

    let paid = already_paid + amount;
    let status = if paid == total {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::PartiallyPaid
    };
    Ok((paid, status))
}
